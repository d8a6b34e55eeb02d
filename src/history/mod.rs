pub mod storage;
pub mod types;

pub use storage::ResponseHistory;
pub use types::ResponseRecord;
