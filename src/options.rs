/// Configures the HTTP transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}
