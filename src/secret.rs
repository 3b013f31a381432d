//! Archive password selection
//!
//! Passwords come from an external wordlist (classically `rockyou.txt`)
//! that is read once at startup. The file is treated as raw bytes and each
//! line is decoded one byte per character (Latin-1), so arbitrary byte
//! values never make loading fail.
//!
//! Selection uses the operating system CSPRNG. The chosen word protects
//! the zip shard, so a predictable generator would hand the password to
//! anyone able to replay the seed.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use std::path::Path;
use thiserror::Error;

/// Password used when no wordlist is available
pub const DEFAULT_PASSWORD: &str = "default_pass";

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while building or sampling a wordlist
#[derive(Error, Debug)]
pub enum WordlistError {
    /// The wordlist has no entries to draw from
    #[error("wordlist is empty")]
    Empty,

    /// The wordlist file exists but could not be read
    #[error("failed to read wordlist {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Wordlist
// ============================================================================

/// Immutable, non-empty list of password candidates
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
}

/// Options controlling how raw wordlist bytes are filtered
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Drop lines containing bytes outside printable ASCII
    pub ascii_only: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { ascii_only: true }
    }
}

impl Wordlist {
    /// Build a wordlist from already decoded words
    pub fn new(words: Vec<String>) -> Result<Self, WordlistError> {
        if words.is_empty() {
            return Err(WordlistError::Empty);
        }
        Ok(Self { words })
    }

    /// The single-entry list used when nothing better is available
    pub fn fallback() -> Self {
        Self {
            words: vec![DEFAULT_PASSWORD.to_string()],
        }
    }

    /// Load a wordlist file, falling back to [`Wordlist::fallback`] when the
    /// file is missing or yields no usable lines.
    pub fn load_or_fallback(path: &Path, options: LoadOptions) -> Result<Self, WordlistError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Wordlist not found, using fallback password");
                return Ok(Self::fallback());
            }
            Err(source) => {
                return Err(WordlistError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let (words, skipped) = parse_lines(&bytes, options);
        tracing::info!(
            path = %path.display(),
            words = words.len(),
            skipped,
            "Wordlist loaded"
        );

        match Self::new(words) {
            Ok(list) => Ok(list),
            Err(WordlistError::Empty) => {
                tracing::warn!(path = %path.display(), "Wordlist has no usable entries, using fallback password");
                Ok(Self::fallback())
            }
            Err(e) => Err(e),
        }
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether there are no candidates
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `word` is one of the candidates
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Borrow the candidates
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Split raw bytes into decoded words; returns the words and the number of
/// non-empty lines that were dropped by the filter.
fn parse_lines(bytes: &[u8], options: LoadOptions) -> (Vec<String>, usize) {
    let mut words = Vec::new();
    let mut skipped = 0usize;

    for line in bytes.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        if options.ascii_only && !line.iter().all(|b| (0x20..=0x7e).contains(b)) {
            skipped += 1;
            continue;
        }
        words.push(latin1_decode(line));
    }

    (words, skipped)
}

/// Decode bytes as ISO-8859-1: every byte maps to the code point of the same value
pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

// ============================================================================
// Selection
// ============================================================================

/// Pick one password uniformly at random using the OS CSPRNG.
pub fn choose(wordlist: &[String]) -> Result<String, WordlistError> {
    wordlist
        .choose(&mut OsRng)
        .cloned()
        .ok_or(WordlistError::Empty)
}

/// Selector bound to a loaded [`Wordlist`]
#[derive(Debug, Clone)]
pub struct SecretSelector {
    wordlist: Wordlist,
}

impl SecretSelector {
    /// Create a selector over a wordlist
    pub fn new(wordlist: Wordlist) -> Self {
        Self { wordlist }
    }

    /// Draw one password
    pub fn choose(&self) -> Result<String, WordlistError> {
        choose(self.wordlist.words())
    }

    /// The underlying wordlist
    pub fn wordlist(&self) -> &Wordlist {
        &self.wordlist
    }
}
