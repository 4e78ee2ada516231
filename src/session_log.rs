//! Append-only CSV history of finished sessions, one line per session, with
//! a header emitted on first write. Lives in the config dir by default.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use directories::ProjectDirs;

#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

/// One row of the history file.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub mode: &'a str,
    pub target_chars: usize,
    pub elapsed_secs: f64,
    pub wpm: f64,
    pub accuracy: f64,
}

impl SessionLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "klack") {
            pd.config_dir().join("history.csv")
        } else {
            PathBuf::from("klack_history.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &LogRecord<'_>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let mut log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        if needs_header {
            writeln!(log_file, "date,mode,target_chars,elapsed_secs,wpm,accuracy")?;
        }

        writeln!(
            log_file,
            "{},{},{},{:.2},{:.2},{:.2}",
            Local::now().format("%c"),
            record.mode,
            record.target_chars,
            record.elapsed_secs,
            record.wpm,
            record.accuracy,
        )
    }
}
