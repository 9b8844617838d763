use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length for Kafka topic names.
///
/// Brokers reject anything longer than 249 characters.
pub const MAX_TOPIC_LENGTH: usize = 249;

/// Validate a Kafka topic name.
///
/// Rules:
/// - Must be between 1 and 249 characters
/// - Can contain ASCII alphanumerics, dots, underscores, and hyphens
/// - Cannot be exactly `.` or `..`
pub fn validate_topic_name(topic: &str) -> AppResult<()> {
    if topic.is_empty() {
        return Err(AppError::Config("Topic name cannot be empty".to_string()));
    }

    if topic.len() > MAX_TOPIC_LENGTH {
        return Err(AppError::Config(format!(
            "Topic name cannot exceed {MAX_TOPIC_LENGTH} characters (got {})",
            topic.len()
        )));
    }

    if topic == "." || topic == ".." {
        return Err(AppError::Config(format!(
            "Topic name cannot be '{topic}'"
        )));
    }

    if let Some((i, c)) = topic
        .chars()
        .enumerate()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(AppError::Config(format!(
            "Topic name contains invalid character '{c}' at position {i}. \
             Only alphanumeric characters, dots, underscores, and hyphens are allowed"
        )));
    }

    Ok(())
}

/// Validate the number of records in a list submission.
pub fn validate_batch_size(len: usize, max: usize) -> AppResult<()> {
    if len > max {
        return Err(AppError::InvalidData(format!(
            "Batch size {len} exceeds maximum of {max} records"
        )));
    }
    Ok(())
}
