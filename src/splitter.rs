//! Order-preserving secret splitting
//!
//! A secret is cut into `n` contiguous shards whose lengths differ by at
//! most one character. Earlier shards receive the extra characters, so
//! shard `i` always goes to node `i` and concatenating the shards in node
//! order gives back the original secret.
//!
//! Lengths are counted in Unicode scalar values, never bytes, so every
//! shard is valid UTF-8 and can travel inside a JSON string.

/// Split `s` into `n` contiguous parts of near-equal length.
///
/// Returns an empty vector when `n == 0`.
///
/// # Examples
///
/// ```
/// use flagshard::splitter::split;
///
/// assert_eq!(split("ABCDE", 3), vec!["AB", "CD", "E"]);
/// assert_eq!(split("", 2), vec!["", ""]);
/// assert!(split("ABC", 0).is_empty());
/// ```
pub fn split(s: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }

    let (base, remainder) = part_lengths(s.chars().count(), n);
    let mut chars = s.chars();

    (0..n)
        .map(|i| {
            let len = base + usize::from(i < remainder);
            chars.by_ref().take(len).collect()
        })
        .collect()
}

/// Base part length and how many leading parts get one extra character.
fn part_lengths(len: usize, n: usize) -> (usize, usize) {
    (len / n, len % n)
}
