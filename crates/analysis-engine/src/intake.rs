//! Upload intake
//!
//! Validates a user submission (or a built-in sample selection) and turns it
//! into an [`UploadedFile`] for the analysis pipeline. Only the media type is
//! checked; file content is never read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared_types::{UploadedFile, PDF_MEDIA_TYPE};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Notification shown when an upload is accepted
pub const UPLOAD_ACCEPTED_NOTICE: &str = "Document uploaded successfully!";

/// Notification shown when an upload is rejected for its type
pub const UPLOAD_REJECTED_NOTICE: &str = "Please upload a PDF file";

/// A file offered by the user, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size_bytes,
        }
    }
}

/// Built-in demo documents that skip validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleDocument {
    CreditAgreement,
    LeveragedLoan,
}

impl SampleDocument {
    pub const ALL: [SampleDocument; 2] = [
        SampleDocument::CreditAgreement,
        SampleDocument::LeveragedLoan,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            SampleDocument::CreditAgreement => "sample-credit-agreement.pdf",
            SampleDocument::LeveragedLoan => "sample-leveraged-loan.pdf",
        }
    }

    /// Identifier used in API paths
    pub fn slug(&self) -> &'static str {
        match self {
            SampleDocument::CreditAgreement => "credit-agreement",
            SampleDocument::LeveragedLoan => "leveraged-loan",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SampleDocument::CreditAgreement => "Sample: Credit Agreement",
            SampleDocument::LeveragedLoan => "Sample: Leveraged Loan",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            SampleDocument::CreditAgreement => "$500M Syndicated Loan",
            SampleDocument::LeveragedLoan => "$250M LBO Financing",
        }
    }

    /// Zero-byte stand-in file for this sample
    pub fn to_uploaded_file(&self) -> UploadedFile {
        UploadedFile::new(self.file_name(), PDF_MEDIA_TYPE, 0)
    }
}

impl fmt::Display for SampleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sample '{0}'. Supported: credit-agreement, leveraged-loan")]
pub struct UnknownSample(pub String);

impl FromStr for SampleDocument {
    type Err = UnknownSample;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit-agreement" | "credit_agreement" => Ok(SampleDocument::CreditAgreement),
            "leveraged-loan" | "leveraged_loan" => Ok(SampleDocument::LeveragedLoan),
            other => Err(UnknownSample(other.to_string())),
        }
    }
}

/// What the user handed to intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCandidate {
    /// A drop or browse selection; only the first file counts
    Files(Vec<FileDescriptor>),
    Sample(SampleDocument),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("No file provided")]
    NoFile,

    #[error("Unsupported media type '{media_type}' for '{name}'")]
    UnsupportedMediaType { name: String, media_type: String },
}

impl IntakeError {
    /// User-visible notification for this rejection
    pub fn notification(&self) -> &'static str {
        match self {
            IntakeError::NoFile => "Please choose a PDF file to upload",
            IntakeError::UnsupportedMediaType { .. } => UPLOAD_REJECTED_NOTICE,
        }
    }
}

/// Validate a submission.
///
/// Returns the accepted file, or the reason it was rejected. A rejection must
/// leave the caller's state untouched and must not start the pipeline.
pub fn submit(candidate: UploadCandidate) -> Result<UploadedFile, IntakeError> {
    match candidate {
        UploadCandidate::Sample(sample) => {
            info!("Sample selected: {}", sample);
            Ok(sample.to_uploaded_file())
        }
        UploadCandidate::Files(files) => {
            let ignored = files.len().saturating_sub(1);
            let file = files.into_iter().next().ok_or(IntakeError::NoFile)?;
            if ignored > 0 {
                debug!("Ignoring {} extra file(s) in batch", ignored);
            }

            let file = UploadedFile::new(file.name, file.media_type, file.size_bytes);
            if !file.is_pdf() {
                warn!(
                    "Rejected upload '{}' with media type '{}'",
                    file.name, file.media_type
                );
                return Err(IntakeError::UnsupportedMediaType {
                    name: file.name,
                    media_type: file.media_type,
                });
            }

            info!("Accepted upload '{}' ({} bytes)", file.name, file.size_bytes);
            Ok(file)
        }
    }
}
