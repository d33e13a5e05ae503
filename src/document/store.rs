use crate::document::Document;
use dashmap::DashMap;
use url::Url;

/// Open documents keyed by URI.
///
/// Accessors return owned snapshots so no map guard is held across an
/// `.await` in the server.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: Url, text: String, version: i32) {
        self.documents.insert(uri, Document::new(text, version));
    }

    pub fn get(&self, uri: &Url) -> Option<Document> {
        self.documents.get(uri).map(|doc| doc.clone())
    }

    pub fn get_document_text(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.text().to_string())
    }

    /// Replace the text of `uri` through `update`, keeping the store locked
    /// for the whole read-modify-write. Returns the new text, or `None`
    /// when the document is not open.
    pub fn update_with(
        &self,
        uri: &Url,
        version: i32,
        update: impl FnOnce(&str) -> String,
    ) -> Option<String> {
        let mut doc = self.documents.get_mut(uri)?;
        let text = update(doc.text());
        *doc = Document::new(text.clone(), version);
        Some(text)
    }

    pub fn remove(&self, uri: &Url) -> Option<Document> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    /// URIs of open documents, optionally limited to those `filter` accepts
    pub fn uris_matching(&self, filter: impl Fn(&Url) -> bool) -> Vec<Url> {
        self.documents
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|uri| filter(uri))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
