use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use serde::{de::DeserializeOwned, Serialize};
use tabled::{settings::Style, Table, Tabled};

use crate::error::{Error, Result};

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json_output(json: bool) {
    OUTPUT_JSON.store(json, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Confirmation line after a file has been written (stdout stays a single
/// JSON document in JSON mode)
pub fn print_written(path: &Path, what: &str) {
    if is_json_output() {
        tracing::info!("wrote {what} to {}", path.display());
    } else {
        println!("{} {what} to {}", "Wrote".green().bold(), path.display());
    }
}

/// Pretty JSON with 4-space indentation; non-ASCII text is written as-is.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = to_json_string(value)?;
    std::fs::write(path, contents).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| Error::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Format a minute count as `1h 30m`
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{sign}{m}m"),
        (h, 0) => format!("{sign}{h}h"),
        (h, m) => format!("{sign}{h}h {m}m"),
    }
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_uses_four_spaces_and_raw_utf8() {
        let text = to_json_string(&json!({"stage": "設計"})).unwrap();
        assert_eq!(text, "{\n    \"stage\": \"設計\"\n}");
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &json!({"backlogs": []})).unwrap();
        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value, json!({"backlogs": []}));
    }

    #[test]
    fn read_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            read_json::<serde_json::Value>(&path),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn minutes_format() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(70), "1h 10m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(-30), "-30m");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("ログイン画面の実装", 20), "ログイン画面の実装");
        assert_eq!(truncate("ログイン画面の実装", 6), "ログイ...");
    }
}
