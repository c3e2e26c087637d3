use thiserror::Error;

/// Errors raised while building or executing a statement.
///
/// Builder errors are raised by the call that violated the contract; the
/// builder that produced them is consumed and must not be reused.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid identifier: `{identifier}`")]
    InvalidIdentifier { identifier: String },

    #[error("invalid operator: `{operator}`")]
    InvalidOperator { operator: String },

    #[error("invalid arity for {operator}: {reason}")]
    InvalidArity { operator: &'static str, reason: String },

    #[error("invalid order direction: `{direction}`")]
    InvalidDirection { direction: String },

    #[error("unsupported query mode: `{mode}`")]
    UnsupportedQueryMode { mode: String },

    #[error("{mode} data cannot be empty")]
    EmptyPayload { mode: &'static str },

    #[error("no table was set for the {mode} statement")]
    MissingTable { mode: &'static str },

    #[error("connection error: {source}")]
    Connection {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl QueryError {
    pub fn invalid_identifier<S: ToString>(identifier: S) -> Self {
        Self::InvalidIdentifier { identifier: identifier.to_string() }
    }

    pub fn invalid_operator<S: ToString>(operator: S) -> Self {
        Self::InvalidOperator { operator: operator.to_string() }
    }

    pub fn invalid_arity<S: ToString>(operator: &'static str, reason: S) -> Self {
        Self::InvalidArity { operator, reason: reason.to_string() }
    }

    pub fn invalid_direction<S: ToString>(direction: S) -> Self {
        Self::InvalidDirection { direction: direction.to_string() }
    }

    pub fn unsupported_query_mode<S: ToString>(mode: S) -> Self {
        Self::UnsupportedQueryMode { mode: mode.to_string() }
    }

    pub fn connection<E: Into<Box<dyn std::error::Error + Send + Sync>>>(e: E) -> Self {
        Self::Connection { source: e.into() }
    }
}
