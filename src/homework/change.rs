use crate::homework::types::ReviewItem;

/// Whether the newest homework warrants a message.
///
/// True only when there is a candidate and it differs from the last one sent.
pub fn should_notify(candidate: Option<&ReviewItem>, last_notified: Option<&ReviewItem>) -> bool {
    match candidate {
        Some(item) => last_notified != Some(item),
        None => false,
    }
}
