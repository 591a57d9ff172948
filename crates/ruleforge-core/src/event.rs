//! The unit of work that flows through compiled expressions.

use serde_json::Value;

use crate::document::Document;

/// One event under evaluation.
///
/// An `Event` owns exactly one [`Document`] and exposes its field
/// operations. Compiled expressions stay immutable and shared; the event is
/// the mutable side, written into by map terms as it moves through a tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    document: Document,
}

impl Event {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn from_value(root: Value) -> Self {
        Self::new(Document::from_value(root))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn exists(&self, path: &str) -> bool {
        self.document.exists(path)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.document.get(path)
    }

    pub fn set(&mut self, path: &str, value: Value) {
        self.document.set(path, value);
    }

    pub fn equals_value(&self, path: &str, expected: &Value) -> bool {
        self.document.equals_value(path, expected)
    }

    pub fn equals_field(&self, left: &str, right: &str) -> bool {
        self.document.equals_field(left, right)
    }
}

impl From<Value> for Event {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}

impl From<Document> for Event {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}
