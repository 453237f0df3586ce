//! Output port for writing extraction records.

use crate::domain::EmbeddingRecord;

/// Port for outputting embedding records.
pub trait RecordOutput: Send + Sync {
    /// Writes a single extraction record.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, record: &EmbeddingRecord) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
