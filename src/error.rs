//! Error taxonomy for user actions.
//!
//! Every variant aborts only the current command; the user can retry.

use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors of a submission, collected in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please check the entered data:\n{0}")]
    Validation(ValidationErrors),

    #[error("Session has expired. Please log in again with `psikotes login`.")]
    SessionExpired,

    #[error("Store operation failed: {0}")]
    Store(StoreError),

    #[error("Record {0} not found")]
    NotFound(String),

    #[error("Failed to save {table} data: {source}{}", compensation_note(.compensation))]
    PartialWrite {
        table: &'static str,
        #[source]
        source: StoreError,
        /// Failures hit while undoing the rows already written.
        compensation: Vec<StoreError>,
    },

    #[error("Export failed: {0}")]
    Export(#[from] crate::export::ExportError),
}

fn compensation_note(compensation: &[StoreError]) -> String {
    if compensation.is_empty() {
        " (rows already written were removed)".to_string()
    } else {
        let reasons: Vec<String> = compensation.iter().map(|e| e.to_string()).collect();
        format!(
            " (cleanup also failed, personal record may remain: {})",
            reasons.join("; ")
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized { .. } => AppError::SessionExpired,
            other => AppError::Store(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}
