use snaplink_core::StorageError;
use snaplink_generator::GeneratorError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("short code already exists: {0}")]
    DuplicateShortcode(String),
    #[error("link not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Why a batch submission failed. Row numbers are 1-based.
///
/// `Display` renders the message shown to the user next to the form.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    #[error("Row {row}: Invalid URL")]
    InvalidUrl { row: usize, url: String },
    #[error("Row {row}: Invalid shortcode \"{code}\"")]
    InvalidShortcode { row: usize, code: String },
    #[error("Row {row}: Shortcode \"{code}\" already used")]
    DuplicateShortcode { row: usize, code: String },
    #[error("Row {row}: {source}")]
    Generator {
        row: usize,
        #[source]
        source: GeneratorError,
    },
    #[error("{0}")]
    Registry(#[from] RegistryError),
}

impl SubmissionError {
    /// The offending row, when the failure is tied to one.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::InvalidUrl { row, .. }
            | Self::InvalidShortcode { row, .. }
            | Self::DuplicateShortcode { row, .. }
            | Self::Generator { row, .. } => Some(*row),
            Self::Registry(_) => None,
        }
    }
}
