use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema IR decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid namespace {0}: components must be identifiers")]
    InvalidNamespace(String),

    #[error("Invalid default {literal} for field {field}: {reason}")]
    InvalidConstant {
        field:   String,
        literal: String,
        reason:  String,
    },

    /// The IR broke an invariant the front end is responsible for. Not recoverable.
    #[error("Schema IR invariant violated in {entity}: {msg}")]
    InvariantViolation {
        entity: String,
        msg:    String,
    },

    #[error("Union field {field} of {entity} is not supported by the Julia generator")]
    UnsupportedUnion {
        entity: String,
        field:  String,
    },
}

impl GenError {
    pub(crate) fn invariant(entity: &str, msg: impl Into<String>) -> GenError {
        GenError::InvariantViolation {
            entity: entity.to_string(),
            msg:    msg.into(),
        }
    }
}
