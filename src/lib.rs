//! `sqlgate-http` is a typed async client for a SQL-over-HTTP gateway.
//!
//! Reads pair SQL with a composable row [`Decoder`]:
//! - [`Connection::get_all`]
//! - [`Connection::get_one`]
//! - [`Connection::get_maybe_one`]
//!
//! Writes report affected-row counts:
//! - [`Connection::execute`]
//! - [`Connection::transaction`]

mod audit;
mod codec;
mod connection;
pub mod decoder;
mod error;
mod fold;
mod options;
mod query;
mod transport;
mod value;
mod wire;

pub use audit::LogSink;
pub use connection::{Connection, Credentials};
pub use decoder::{Decoder, Primitive, Row};
pub use error::{DecodeError, SqlGateError};
pub use options::TransportOptions;
pub use query::{Query, Statement};
pub use transport::{HttpTransport, Transport, TransportError};
pub use value::{Payload, Value};

pub type Result<T> = std::result::Result<T, SqlGateError>;
