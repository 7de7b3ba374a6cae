use crate::error::ExtractionError;
use crate::homework::types::{ReviewItem, ReviewStatus};

/// Compose the chat message for a homework whose status changed.
pub fn describe(item: &ReviewItem) -> Result<String, ExtractionError> {
    let name = item
        .homework_name
        .as_deref()
        .ok_or(ExtractionError::MissingField("homework_name"))?;
    let code = item.status.as_deref().ok_or(ExtractionError::MissingField("status"))?;
    let status: ReviewStatus = code.parse()?;

    log::debug!("Homework {} has status {}", name, status);
    Ok(format!("Изменился статус проверки работы \"{}\". {}", name, status.verdict()))
}

/// Chat message reporting a cycle failure
pub fn failure_message(error: &impl std::fmt::Display) -> String {
    format!("Сбой в работе программы: {}", error)
}
