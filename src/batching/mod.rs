//! Greedy bin-packing of text items into size-bounded request batches.
//!
//! Used to split bulk embedding payloads so no single request exceeds the
//! service's size limit. Items are never split or reordered.

/// Pack items into batches whose total character length stays within
/// `max_len`.
///
/// Iterates items in order, starting a new batch whenever adding an item
/// would push the current batch over the limit. An item longer than
/// `max_len` on its own still lands in a batch of one. Empty input yields
/// zero batches.
pub fn pack<S: AsRef<str> + Clone>(items: &[S], max_len: usize) -> Vec<Vec<S>> {
    let mut batches: Vec<Vec<S>> = Vec::new();
    let mut current: Vec<S> = Vec::new();
    let mut current_len = 0usize;

    for item in items {
        let len = item.as_ref().chars().count();
        if !current.is_empty() && current_len + len > max_len {
            batches.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += len;
        current.push(item.clone());
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
