//! Key name rules.
//!
//! A key name is 1..=max bytes of ASCII alphanumerics, `_`, `-` and `.`,
//! and must start and end with an alphanumeric or `_`.

/// Why a key name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNameRejection {
    /// The name is empty.
    Empty,
    /// The name exceeds the length limit.
    TooLong {
        /// Actual length in bytes.
        length: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// The name contains a disallowed byte.
    InvalidCharacter {
        /// The offending character.
        ch: char,
    },
    /// The name starts or ends with `-` or `.`.
    InvalidBoundary,
}

impl KeyNameRejection {
    /// Human-readable reason.
    pub fn reason(&self) -> String {
        match self {
            KeyNameRejection::Empty => "name cannot be empty".to_string(),
            KeyNameRejection::TooLong { length, max } => format!("name too long: {length} bytes (max {max})"),
            KeyNameRejection::InvalidCharacter { ch } => format!("character {ch:?} is not allowed"),
            KeyNameRejection::InvalidBoundary => "name must start and end with a letter, digit or '_'".to_string(),
        }
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Check a key name against the naming rules.
pub fn check_key_name(name: &str, max_length: usize) -> Result<(), KeyNameRejection> {
    let bytes = name.as_bytes();
    let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
        return Err(KeyNameRejection::Empty);
    };
    if bytes.len() > max_length {
        return Err(KeyNameRejection::TooLong {
            length: bytes.len(),
            max: max_length,
        });
    }
    if let Some(ch) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
        return Err(KeyNameRejection::InvalidCharacter { ch });
    }
    if !is_word_byte(first) || !is_word_byte(last) {
        return Err(KeyNameRejection::InvalidBoundary);
    }
    Ok(())
}
