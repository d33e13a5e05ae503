pub mod diagnostics;
pub mod pipeline;
pub mod semantic;
pub mod symbols;

pub use diagnostics::{parse_error_diagnostics, token_error_diagnostics};
pub use pipeline::{DocumentAnalysis, DocumentPipeline};
pub use semantic::HighlightMap;
pub use symbols::token_symbols;
