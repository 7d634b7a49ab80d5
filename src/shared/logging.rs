use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Destination for structured bot log records, one JSON object per line.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    path: Option<PathBuf>,
    echo_stderr: bool,
}

impl LogSink {
    pub fn new(path: Option<PathBuf>, echo_stderr: bool) -> Self {
        Self { path, echo_stderr }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Some(path.into()), false)
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.record("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.record("warn", event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.record("error", event, message);
    }

    pub fn record(&self, level: &str, event: &str, message: &str) {
        if self.path.is_none() && !self.echo_stderr {
            return;
        }

        let payload = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "level": level,
            "event": event,
            "message": message,
        });
        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };

        if self.echo_stderr {
            eprintln!("{line}");
        }

        let Some(path) = self.path.as_ref() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}
