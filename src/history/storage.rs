use super::types::ResponseRecord;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only session history of AI responses
///
/// Records are appended strictly after a successful AI call; failed requests
/// never touch the list. Cleared only when the session ends.
#[derive(Debug, Clone)]
pub struct ResponseHistory {
    records: Arc<RwLock<Vec<ResponseRecord>>>,
}

impl ResponseHistory {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn record(&self, record: ResponseRecord) {
        self.records.write().push(record);
    }

    pub fn get_all(&self) -> Vec<ResponseRecord> {
        self.records.read().clone()
    }

    /// The most recent response, kept for display/speech/download
    pub fn last(&self) -> Option<ResponseRecord> {
        self.records.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl Default for ResponseHistory {
    fn default() -> Self {
        Self::new()
    }
}
