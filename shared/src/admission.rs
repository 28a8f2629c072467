//! Admission of dropped or selected files into a batch.
//!
//! Works in two stages. [`validate`] checks every candidate on its own
//! (type, size, and the per-drop file count) and records structured error
//! codes. [`admit`] then turns that outcome into a decision for the batch:
//! either a combined user-facing message or the files to append.

use std::fmt;
use std::str::FromStr;

use strum_macros::{AsRefStr, EnumString};

use crate::FileRecord;
use crate::constraint::FileConstraint;
use crate::format::format_bytes;

/// Structured error code attached to a rejected candidate.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCode {
    FileTooLarge,
    FileInvalidType,
    TooManyFiles,
    #[strum(default)]
    Other(String),
}

impl ErrorCode {
    pub fn as_code(&self) -> &str {
        match self {
            // Derived `as_ref` names the default variant itself, not its code.
            ErrorCode::Other(code) => code,
            known => known.as_ref(),
        }
    }

    pub fn parse(code: &str) -> Self {
        // The default variant makes parsing infallible.
        ErrorCode::from_str(code).unwrap_or_else(|_| ErrorCode::Other(code.to_string()))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub code: ErrorCode,
    pub message: String,
}

impl FileError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RejectedFile<P> {
    pub file: FileRecord<P>,
    pub errors: Vec<FileError>,
}

/// Result of checking one drop event, before the batch size is considered.
#[derive(Debug, Clone)]
pub struct DropOutcome<P> {
    pub accepted: Vec<FileRecord<P>>,
    pub rejected: Vec<RejectedFile<P>>,
}

impl<P> Default for DropOutcome<P> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Per-candidate check against the constraint.
pub fn validate<P>(
    candidates: impl IntoIterator<Item = FileRecord<P>>,
    constraint: &FileConstraint,
) -> DropOutcome<P> {
    let mut outcome = DropOutcome::default();

    for file in candidates {
        let mut errors = Vec::new();
        if !constraint.accepts(&file.name, &file.mime_type) {
            errors.push(FileError::new(
                ErrorCode::FileInvalidType,
                format!("File type must be {}", constraint.accept_attr()),
            ));
        }
        if constraint.exceeds_size(file.size_bytes) {
            errors.push(FileError::new(
                ErrorCode::FileTooLarge,
                format!("File is larger than {} bytes", constraint.max_size),
            ));
        }

        if errors.is_empty() {
            outcome.accepted.push(file);
        } else {
            log::debug!("{} failed validation: {:?}", file.name, errors);
            outcome.rejected.push(RejectedFile { file, errors });
        }
    }

    if outcome.accepted.len() > constraint.max_files {
        log::debug!(
            "Drop holds {} acceptable files, limit is {}",
            outcome.accepted.len(),
            constraint.max_files
        );
        for file in outcome.accepted.drain(..) {
            outcome.rejected.push(RejectedFile {
                file,
                errors: vec![FileError::new(ErrorCode::TooManyFiles, "Too many files")],
            });
        }
    }

    outcome
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    TooLarge { max_size: u64 },
    InvalidType,
    Other(String),
}

impl RejectionReason {
    fn from_error(error: &FileError, max_size: u64) -> Self {
        match error.code {
            ErrorCode::FileTooLarge => RejectionReason::TooLarge { max_size },
            ErrorCode::FileInvalidType => RejectionReason::InvalidType,
            _ => RejectionReason::Other(error.message.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectionReason::TooLarge { max_size } => write!(
                f,
                "{} is too large. Max size is {}.",
                self.name,
                format_bytes(*max_size)
            ),
            RejectionReason::InvalidType => write!(f, "{} has an invalid file type.", self.name),
            RejectionReason::Other(message) => write!(f, "{}: {}", self.name, message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("{}", join_messages(.0))]
    Rejected(Vec<Rejection>),
    #[error("You can only upload a maximum of {max_files} files.")]
    TooManyFiles { max_files: usize },
}

fn join_messages(rejections: &[Rejection]) -> String {
    rejections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decide whether the validated drop may be appended to a batch of `current_count` files.
///
/// Any per-file rejection rejects the whole event. The batch-wide count is
/// only checked when every candidate passed, and never admits partially.
pub fn admit<P>(
    outcome: DropOutcome<P>,
    current_count: usize,
    constraint: &FileConstraint,
) -> Result<Vec<FileRecord<P>>, AdmissionError> {
    if !outcome.rejected.is_empty() {
        let rejections = outcome
            .rejected
            .iter()
            .map(|rejected| Rejection {
                name: rejected.file.name.clone(),
                reason: rejected
                    .errors
                    .first()
                    .map(|e| RejectionReason::from_error(e, constraint.max_size))
                    .unwrap_or_else(|| RejectionReason::Other("rejected".to_string())),
            })
            .collect::<Vec<_>>();
        log::info!("Rejected {} file(s) from drop", rejections.len());
        return Err(AdmissionError::Rejected(rejections));
    }

    if current_count + outcome.accepted.len() > constraint.max_files {
        log::info!(
            "Batch of {} cannot take {} more (max {})",
            current_count,
            outcome.accepted.len(),
            constraint.max_files
        );
        return Err(AdmissionError::TooManyFiles {
            max_files: constraint.max_files,
        });
    }

    Ok(outcome.accepted)
}

/// [`validate`] followed by [`admit`].
pub fn admit_drop<P>(
    candidates: impl IntoIterator<Item = FileRecord<P>>,
    current_count: usize,
    constraint: &FileConstraint,
) -> Result<Vec<FileRecord<P>>, AdmissionError> {
    admit(validate(candidates, constraint), current_count, constraint)
}
