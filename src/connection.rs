use std::{fmt, path::PathBuf, sync::Arc};

use serde::Serialize;

use crate::{
    codec::{
        build_query_request, build_transaction_request, parse_query_response,
        parse_statement_response,
    },
    fold::{exactly_one, maybe_one},
    HttpTransport, LogSink, Query, Result, Statement, Transport,
};

/// Username/password pair embedded in every request body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable handle to a SQL gateway.
///
/// Builders return new values, so a `Connection` can be cloned and shared
/// across tasks freely. No session state is kept between calls.
#[derive(Clone)]
pub struct Connection {
    transport: Arc<dyn Transport>,
    url: String,
    credentials: Option<Credentials>,
    log: Option<LogSink>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .field("log", &self.log)
            .finish()
    }
}

impl Connection {
    /// Creates a connection over an explicit transport.
    pub fn init(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            credentials: None,
            log: None,
        }
    }

    /// Creates a connection using the default [`HttpTransport`].
    pub fn new(url: impl Into<String>) -> Self {
        Self::init(Arc::new(HttpTransport::new()), url)
    }

    /// Creates a connection from environment variables.
    ///
    /// Reads:
    /// - `SQLGATE_URL` — gateway endpoint (required)
    /// - `SQLGATE_USER` / `SQLGATE_PASSWORD` — credentials (optional, both or neither)
    /// - `SQLGATE_LOG_FILE` — audit log path (optional)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sqlgate_http::Connection;
    ///
    /// let db = Connection::from_env().expect("missing SQLGATE_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(get: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = get("SQLGATE_URL")
            .ok_or_else(|| "missing SQLGATE_URL environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("SQLGATE_URL is set but empty".to_owned());
        }
        let mut connection = Self::new(url);
        let non_empty = |name: &str| get(name).filter(|value| !value.trim().is_empty());

        match (non_empty("SQLGATE_USER"), non_empty("SQLGATE_PASSWORD")) {
            (Some(user), Some(password)) => connection = connection.with_auth(user, password),
            (None, None) => {}
            _ => {
                return Err("SQLGATE_USER and SQLGATE_PASSWORD must be set together".to_owned())
            }
        }

        if let Some(path) = non_empty("SQLGATE_LOG_FILE") {
            connection = connection.with_log_file(path);
        }
        Ok(connection)
    }

    /// Returns a copy that sends `user`/`password` with every request.
    pub fn with_auth(&self, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials::new(user, password)),
            ..self.clone()
        }
    }

    /// Returns a copy that appends every request to the file at `path`.
    pub fn with_log_file(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            log: Some(LogSink::new(path)),
            ..self.clone()
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn log_sink(&self) -> Option<&LogSink> {
        self.log.as_ref()
    }

    /// Runs a query and decodes every returned row.
    pub async fn get_all<T: 'static>(&self, query: &Query<T>) -> Result<Vec<T>> {
        let body = build_query_request(self.credentials.as_ref(), &query.sql, &query.params)?;
        let response = self.send(body, 1).await?;
        parse_query_response(&response, &query.decoder)
    }

    /// Runs a query that must return exactly one row.
    pub async fn get_one<T: 'static>(&self, query: &Query<T>) -> Result<T> {
        exactly_one(self.get_all(query).await?)
    }

    /// Runs a query and returns the row only when exactly one came back.
    ///
    /// Zero rows and several rows both yield `None`. Use [`Connection::get_one`]
    /// to tell those cases apart.
    pub async fn get_maybe_one<T: 'static>(&self, query: &Query<T>) -> Result<Option<T>> {
        Ok(maybe_one(self.get_all(query).await?))
    }

    /// Runs one statement and returns its affected-row count.
    pub async fn execute(&self, statement: &Statement) -> Result<i64> {
        exactly_one(self.transaction(std::slice::from_ref(statement)).await?)
    }

    /// Sends all statements as one atomic transaction.
    ///
    /// Returns one affected-row count per statement, in submitted order.
    pub async fn transaction(&self, statements: &[Statement]) -> Result<Vec<i64>> {
        let body = build_transaction_request(self.credentials.as_ref(), statements)?;
        let response = self.send(body, statements.len()).await?;
        parse_statement_response(&response)
    }

    async fn send(&self, body: String, _entries: usize) -> Result<String> {
        if let Some(log) = &self.log {
            log.record(&self.url, &body).await;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("posting {} transaction entries to {}", _entries, self.url);

        Ok(self.transport.post_json(&self.url, body).await?)
    }
}
