use std::fmt;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SqlGateError {
    /// Network failure reported by the transport (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body is not JSON or does not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// A row did not match the query decoder.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// A parameter could not be encoded into the request body.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The gateway reported `success: false` for one transaction entry.
    #[error("statement {index} reported failure")]
    StatementFailed {
        /// Position of the failing entry in the submitted transaction.
        index: usize,
    },
    /// A single-result operation received nothing.
    #[error("no result")]
    NoResult,
    /// A single-result operation received more than one result.
    #[error("expected one result, got {0}")]
    MultipleResults(usize),
}

/// Failure produced while evaluating a [`Decoder`](crate::Decoder) against a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    message: String,
    row: Option<usize>,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            row: None,
        }
    }

    /// Message describing what the decoder expected.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Index of the failing row inside the result set, when known.
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub(crate) fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {row}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::{DecodeError, SqlGateError};

    #[test]
    fn decode_error_display_includes_row_when_known() {
        let err = DecodeError::new("missing field `id`");
        assert_eq!(err.to_string(), "missing field `id`");
        assert_eq!(err.clone().at_row(3).to_string(), "row 3: missing field `id`");
    }

    #[test]
    fn decode_error_converts_into_public_error() {
        let err: SqlGateError = DecodeError::new("boom").into();
        assert!(matches!(err, SqlGateError::Decode(_)));
        assert_eq!(err.to_string(), "decode error: boom");
    }
}
