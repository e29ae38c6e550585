//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from conversion errors raised while reading API responses.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Connection has no legs
    #[error("connection must have at least one leg")]
    EmptyConnection,

    /// Invalid leg construction (e.g., arrival before departure)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Connection start lies after its end
    #[error("connection {id} ends before it starts")]
    EndBeforeStart { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::EmptyConnection;
        assert_eq!(err.to_string(), "connection must have at least one leg");

        let err = DomainError::InvalidLeg("arrival must not precede departure");
        assert_eq!(
            err.to_string(),
            "invalid leg: arrival must not precede departure"
        );

        let err = DomainError::EndBeforeStart { id: "c-7".into() };
        assert_eq!(err.to_string(), "connection c-7 ends before it starts");
    }
}
