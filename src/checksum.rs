//! Content fingerprints for cheap task change detection.
//!
//! The fingerprint answers one question: did the task's semantic content
//! (title, body, set of children) really change, or was the edit cosmetic?
//! It is not a security primitive; determinism across runs and platforms
//! matters, collision resistance does not.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Field delimiter for the normalized input. The unit separator cannot
/// appear in document text, so fields can never bleed into each other.
const DELIMITER: char = '\u{1f}';

/// Computes a deterministic fingerprint over a task's semantic fields.
///
/// Child ids are sorted lexicographically before hashing, so the order in
/// which children were observed never changes the result; any change to
/// the title, the content, or the child-id *set* does.
#[must_use]
pub fn task_fingerprint(title: &str, content: &str, child_ids: &[String]) -> String {
    let mut children: Vec<&str> = child_ids.iter().map(String::as_str).collect();
    children.sort_unstable();

    let mut normalized = String::with_capacity(
        title.len() + content.len() + children.iter().map(|c| c.len() + 1).sum::<usize>() + 2,
    );
    normalized.push_str(title);
    normalized.push(DELIMITER);
    normalized.push_str(content);
    for child in children {
        normalized.push(DELIMITER);
        normalized.push_str(child);
    }

    format!("{:08x}", fnv1a(normalized.as_bytes()))
}

/// 32-bit FNV-1a over a byte slice, with wrapping arithmetic.
fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
