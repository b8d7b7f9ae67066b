//! Shared types for the projects feature

/// An uploaded byte stream that has not yet been validated or persisted.
///
/// Exists only for the duration of one ingestion call; it is not retained
/// after storage or rejection.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Declared filename, used to derive the extension and the storage path.
    pub filename: String,
    pub content: Vec<u8>,
}
