use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// Append-only file receiving one JSON line per outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the line for `body`, ignoring any I/O failure.
    pub(crate) async fn record(&self, url: &str, body: &str) {
        if let Err(_err) = self.append(url, body).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "audit log append to {} failed: {}",
                self.path.display(),
                _err
            );
        }
    }

    async fn append(&self, url: &str, body: &str) -> io::Result<()> {
        let line = audit_line(url, body)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn audit_line(url: &str, body: &str) -> io::Result<String> {
    let time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let time = serde_json::to_string(&time)?;
    let url = serde_json::to_string(url)?;
    Ok(format!("{{\"time\":{time},\"url\":{url},\"request\":{body}}}\n"))
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::{json, Value as JsonValue};

    use super::{audit_line, LogSink};

    #[test]
    fn line_embeds_request_verbatim() {
        let body = r#"{"transaction":[{"query":"SELECT 1","values":{}}]}"#;
        let line = audit_line("http://db/api", body).expect("must format");
        assert!(line.ends_with('\n'));
        assert!(line.contains(body));

        let parsed: JsonValue = serde_json::from_str(line.trim_end()).expect("must be JSON");
        assert_eq!(parsed["url"], json!("http://db/api"));
        let time = parsed["time"].as_str().expect("time must be a string");
        assert!(time.ends_with('Z'));
        assert_eq!(time.len(), "2024-01-01T00:00:00Z".len());
        assert!(DateTime::parse_from_rfc3339(time).is_ok());
    }

    #[tokio::test]
    async fn record_appends_without_truncating() {
        let dir = tempfile::tempdir().expect("must create temp dir");
        let path = dir.path().join("audit.log");
        std::fs::write(&path, "existing\n").expect("must seed log");

        let sink = LogSink::new(&path);
        sink.record("http://db", "{}").await;
        sink.record("http://db", "[]").await;

        let content = std::fs::read_to_string(&path).expect("must read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing");
        assert!(lines[1].ends_with(r#""request":{}}"#));
        assert!(lines[2].ends_with(r#""request":[]}"#));
    }

    #[tokio::test]
    async fn record_swallows_io_failures() {
        let dir = tempfile::tempdir().expect("must create temp dir");
        let sink = LogSink::new(dir.path().join("missing").join("audit.log"));
        sink.record("http://db", "{}").await;
        assert!(!sink.path().exists());
    }
}
