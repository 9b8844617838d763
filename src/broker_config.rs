//! Broker client configuration loaded from a flat properties file.
//!
//! # File Format
//!
//! ```text
//! # Kafka producer settings
//! bootstrap.servers = localhost:9092
//! acks = all
//! ```
//!
//! - Blank lines and lines starting with `#` are skipped
//! - Each remaining line is split on the first `=`; key and value are trimmed
//! - Lines without `=` are ignored
//!
//! Values are never interpreted here. They are handed to the Kafka client
//! as-is, which rejects anything it does not understand.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// Producer options keyed by librdkafka property name.
pub type ConfigMap = BTreeMap<String, String>;

/// Read and parse the broker config file at `path`.
///
/// # Errors
///
/// Returns `AppError::ConfigRead` if the file cannot be opened or a line
/// cannot be read.
pub fn load_broker_config(path: impl AsRef<Path>) -> AppResult<ConfigMap> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| AppError::ConfigRead(format!("{}: {e}", path.display())))?;

    let config = parse_broker_config(BufReader::new(file))
        .map_err(|e| AppError::ConfigRead(format!("{}: {e}", path.display())))?;

    debug!(path = %path.display(), entries = config.len(), "Broker config loaded");
    Ok(config)
}

/// Parse `key = value` lines from any buffered reader.
///
/// Later duplicates overwrite earlier ones. A line with an empty key
/// (`= value`) is skipped, like a line without `=`, instead of being stored
/// under `""`; librdkafka has no such property and would refuse the whole
/// config.
pub fn parse_broker_config<R: BufRead>(reader: R) -> std::io::Result<ConfigMap> {
    let mut config = ConfigMap::new();

    for line in reader.lines() {
        let line = line?;
        if let Some((key, value)) = parse_line(&line) {
            config.insert(key.to_string(), value.to_string());
        }
    }

    Ok(config)
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key, value.trim()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn parse(input: &str) -> ConfigMap {
        parse_broker_config(Cursor::new(input)).expect("parse should succeed")
    }

    #[test]
    fn test_comments_and_blank_lines_contribute_nothing() {
        let config = parse("  # comment\n\n   \n#another=one\n");
        assert!(config.is_empty());
    }

    #[test]
    fn test_key_value_trimmed() {
        let config = parse("  bootstrap.servers   =   localhost:9092  \n");
        assert_eq!(
            config.get("bootstrap.servers").map(String::as_str),
            Some("localhost:9092")
        );
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_line_without_equals_is_ignored() {
        let config = parse("acks = all\nthis line has no separator\n");
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("acks").map(String::as_str), Some("all"));
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let config = parse("sasl.jaas.config = user=\"a\" password=\"b=c\"\n");
        assert_eq!(
            config.get("sasl.jaas.config").map(String::as_str),
            Some("user=\"a\" password=\"b=c\"")
        );
    }

    #[test]
    fn test_empty_value_is_kept() {
        let config = parse("client.id =\n");
        assert_eq!(config.get("client.id").map(String::as_str), Some(""));
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let config = parse("= orphan\n");
        assert!(config.is_empty());
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let config = parse("acks = 1\nacks = all\n");
        assert_eq!(config.get("acks").map(String::as_str), Some("all"));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let bytes: &[u8] = b"acks = \xff\xfe\n";
        assert!(parse_broker_config(Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# Kafka").unwrap();
        writeln!(file, "bootstrap.servers=broker:9092").unwrap();
        writeln!(file, "linger.ms = 5").unwrap();

        let config = load_broker_config(file.path()).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("linger.ms").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_missing_file_is_config_read_error() {
        let result = load_broker_config("/definitely/not/here/kafka.properties");
        assert!(matches!(result, Err(AppError::ConfigRead(_))));
    }
}
