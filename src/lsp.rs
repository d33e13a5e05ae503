mod client;
mod diagnostic_sequence;
mod lsp_impl;
mod settings;
mod settings_manager;
mod text_sync;

pub use diagnostic_sequence::DiagnosticSequencer;
pub use lsp_impl::InfiniteLs;
pub(crate) use settings::{SettingsEvent, SettingsEventKind, SettingsSource, parse_settings_layer};
