//! Input validation for cipher text.

use std::fmt;

use crate::cipher::in_alphabet;

/// Why a candidate text was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The text has zero length.
    #[error("Can't be empty")]
    EmptyInput,

    /// A character outside `{' ', 'A'..='Z'}` was found.
    #[error("Only uppercase letters and spaces allowed")]
    InvalidCharacter {
        /// The first offending character.
        ch: char,
        /// Its position, counted in characters.
        index: usize,
    },
}

/// Text that is non-empty and consists only of spaces and `A`-`Z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidText(String);

impl ValidText {
    /// Wraps a string already known to satisfy the alphabet invariant.
    pub(crate) fn new_unchecked(text: String) -> Self {
        debug_assert!(!text.is_empty() && text.chars().all(in_alphabet));
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Length in characters (equal to bytes, the alphabet is ASCII).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ValidText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ValidText {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for ValidText {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate(value)
    }
}

/// Check that `text` is non-empty and every character is a space or `A`-`Z`.
///
/// The first violation wins: emptiness is checked before characters, and
/// the earliest bad character is the one reported.
pub fn validate(text: &str) -> Result<ValidText, ValidationError> {
    check(text)?;
    Ok(ValidText(text.to_owned()))
}

fn check(text: &str) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    match text.chars().enumerate().find(|(_, c)| !in_alphabet(*c)) {
        Some((index, ch)) => Err(ValidationError::InvalidCharacter { ch, index }),
        None => Ok(()),
    }
}
