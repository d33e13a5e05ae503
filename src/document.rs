//! Open documents and LSP position mapping.

pub mod position;
pub mod store;

pub use position::PositionMapper;
pub use store::DocumentStore;

/// Text of an open document as last synchronised by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    version: i32,
}

impl Document {
    pub fn new(text: String, version: i32) -> Self {
        Self { text, version }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}
