use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AdviceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Transport,
    FileType,
}

/// A required form field that is absent or blank.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is required", humanize_field(&field));
        Self { field, message }
    }
}

/// Turns `productType` or `financialPreferences.monthlyIncome` into
/// `Product type` / `Monthly income`.
pub fn humanize_field(path: &str) -> String {
    let leaf = path.rsplit('.').next().unwrap_or(path);
    let mut out = String::with_capacity(leaf.len() + 4);
    for (idx, ch) in leaf.chars().enumerate() {
        if idx == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.extend(ch.to_lowercase());
        } else if ch == '_' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("{endpoint} returned a malformed body: {reason}")]
    MalformedBody { endpoint: String, reason: String },
    #[error("invalid endpoint url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    pub fn network(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The user-facing side of a failed submission. Raw transport detail never
/// lands here; it is logged where the failure is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorDetail {
    pub fn from_transport(kind: AdviceKind, err: &TransportError) -> Self {
        let message = match err {
            TransportError::Network { .. } | TransportError::InvalidUrl { .. } => format!(
                "Could not reach the advice service for {kind}. Please check your connection and try again."
            ),
            TransportError::Status { .. } => {
                format!("Failed to get {kind}. Please try again.")
            }
            TransportError::MalformedBody { .. } => format!(
                "The advice service sent an unexpected {kind} response. Please try again."
            ),
        };
        Self {
            code: ErrorCode::Transport,
            message,
            status: err.status(),
        }
    }

    pub fn validation(errors: &[ValidationError]) -> Self {
        let message = if errors.len() == 1 {
            errors[0].message.clone()
        } else {
            "Please fill in all required fields".to_string()
        };
        Self {
            code: ErrorCode::Validation,
            message,
            status: None,
        }
    }
}

/// Raised when a document of the wrong type is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{filename} is {found}; only {expected} files are accepted")]
pub struct FileTypeError {
    pub filename: String,
    pub expected: &'static str,
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownNameError {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownNameError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
