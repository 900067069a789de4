use std::fmt::Display;

use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    /// A store write reported it did not apply although the target was just
    /// read successfully.
    #[error("write not applied: {0}")]
    Inconsistent(String),
    #[error("database error: {0}")]
    Db(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        Self::NotFound(format!("{entity} {id} not found"))
    }

    /// Failures the caller cannot correct; surfaced as internal errors.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Inconsistent(_) | Self::Db(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unexpected_errors() {
        assert!(ServiceError::Db("boom".into()).is_unexpected());
        assert!(ServiceError::Inconsistent("x".into()).is_unexpected());
        assert!(!ServiceError::not_found("banner", 1).is_unexpected());
        assert!(!ServiceError::from(ModelError::Required("html")).is_unexpected());
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(ServiceError::not_found("banner", "abc").to_string(), "not found: banner abc not found");
    }
}
