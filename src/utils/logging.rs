use crate::core::message::{Message, Sender};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends transcript lines to a user-chosen text file.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl TranscriptLog {
    /// Starts logging right away when a path is given.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut log = TranscriptLog {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            log.set_log_file(path)?;
        }
        Ok(log)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        let path = PathBuf::from(path);
        OpenOptions::new().create(true).append(true).open(&path)?;

        let message = format!("Logging enabled to: {}", path.display());
        self.file_path = Some(path);
        self.is_active = true;
        Ok(message)
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        let Some(path) = self.file_path.clone() else {
            return Err("No log file specified. Use /log <filename> to enable logging first.".into());
        };
        if self.is_active {
            self.write_lines("## Logging paused")?;
            self.is_active = false;
            Ok(format!("Logging paused (file: {})", path.display()))
        } else {
            self.is_active = true;
            Ok(format!("Logging resumed to: {}", path.display()))
        }
    }

    /// Writes `message` as `[HH:MM] speaker: text` followed by a blank line.
    pub fn log_message(
        &self,
        message: &Message,
        user_name: &str,
        personality_name: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active {
            return Ok(());
        }
        let speaker = match message.sender {
            Sender::User => user_name,
            Sender::Agent => personality_name,
            Sender::DirectedAgent => "Hitch",
        };
        self.write_lines(&format!(
            "[{}] {}: {}",
            message.time_label(),
            speaker,
            message.text
        ))
    }

    pub fn log_marker(&self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active {
            return Ok(());
        }
        self.write_lines(&format!("## {text}"))
    }

    fn write_lines(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn status_string(&self) -> String {
        let file_name = |path: &Path| {
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn logs_messages_with_speaker_names() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("chat.log");
        let log = TranscriptLog::new(Some(path.to_string_lossy().into_owned())).expect("log");
        assert!(log.is_active());

        log.log_message(&Message::user("oi"), "Ana", "Suzi")
            .expect("user line");
        log.log_message(&Message::inbound("oi Ana!"), "Ana", "Suzi")
            .expect("agent line");
        log.log_message(&Message::inbound("@hitch disse: calma"), "Ana", "Suzi")
            .expect("directed line");

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("] Ana: oi"));
        assert!(lines[1].ends_with("] Suzi: oi Ana!"));
        assert!(lines[2].ends_with("] Hitch: @hitch disse: calma"));
    }

    #[test]
    fn paused_log_writes_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("chat.log");
        let mut log = TranscriptLog::new(None).expect("log");
        assert_eq!(log.status_string(), "disabled");
        assert!(log.toggle_logging().is_err());

        log.set_log_file(path.to_string_lossy().into_owned())
            .expect("enable");
        let paused = log.toggle_logging().expect("pause");
        assert!(paused.starts_with("Logging paused"));
        assert_eq!(log.status_string(), "paused (chat.log)");

        log.log_message(&Message::user("ignored"), "Ana", "Suzi")
            .expect("noop");
        let contents = std::fs::read_to_string(&path).expect("read");
        assert!(!contents.contains("ignored"));
        assert!(contents.contains("## Logging paused"));

        log.toggle_logging().expect("resume");
        assert!(log.is_active());
    }
}
