use crate::notice::Notice;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const TOAST_LOG_FILE: &str = "toast.log";

pub fn append_toast_log(path: &Path, notice: &Notice) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(
            file,
            "{} - [{}] {}",
            Local::now().to_rfc3339(),
            notice.level.label(),
            notice.text
        );
    }
}

/// The last `count` lines of the log, oldest first.
pub fn read_last_lines(path: &Path, count: usize) -> Vec<String> {
    if let Ok(content) = std::fs::read_to_string(path) {
        let mut lines: Vec<String> = content.lines().map(|s| s.to_owned()).collect();
        if lines.len() > count {
            lines.drain(0..lines.len() - count);
        }
        lines
    } else {
        Vec::new()
    }
}
