pub mod admission;
pub mod batch;
pub mod constraint;
pub mod format;
pub mod progress;
pub mod submission;

use serde::{Deserialize, Serialize};

pub use admission::{AdmissionError, DropOutcome, Rejection, RejectionReason};
pub use batch::{Batch, BatchError, FileId};
pub use constraint::FileConstraint;
pub use format::format_bytes;
pub use progress::{Tick, Tickers};
pub use submission::{SubmissionError, SubmissionState, TextGenerator};

/// One admitted (or candidate) file together with its binary payload handle.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord<P> {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub payload: P,
}

impl<P> FileRecord<P> {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            payload,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Multipart field names of `POST /api/generate`.
pub const PROMPT_FIELD: &str = "prompt";
pub const FILE_FIELD: &str = "file";
pub const GENERATE_PATH: &str = "/api/generate";
