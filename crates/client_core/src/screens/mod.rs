//! Screen controllers: one form model, one submission pipeline, and one
//! renderer per advice flow.

pub mod financial;
pub mod pdf;
pub mod product;

pub use financial::FinancialAdvisorScreen;
pub use pdf::{ChatOutcome, PdfAdvisorScreen};
pub use product::ProductAdvisorScreen;

use shared::error::{ErrorDetail, ValidationError};

use crate::submission::SubmitOutcome;

/// Result of asking a form screen to submit.
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmitOutcome<R> {
    /// Required fields were missing; nothing was sent.
    Invalid(Vec<ValidationError>),
    Submitted(SubmitOutcome<R>),
}

impl<R> FormSubmitOutcome<R> {
    pub fn response(&self) -> Option<&R> {
        match self {
            Self::Submitted(SubmitOutcome::Succeeded(response)) => Some(response),
            _ => None,
        }
    }

    /// What to show the user when the attempt did not produce advice.
    pub fn error(&self) -> Option<ErrorDetail> {
        match self {
            Self::Invalid(errors) => Some(ErrorDetail::validation(errors)),
            Self::Submitted(SubmitOutcome::Failed(detail)) => Some(detail.clone()),
            Self::Submitted(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/screens_tests.rs"]
mod tests;
