//! The ROT13 transform over `{' ', 'A'..='Z'}`.

use crate::cipher::{ValidText, ALPHABET_LEN};

const SHIFT: u8 = 13;

/// Encode `text` with ROT13. Spaces are kept in place.
///
/// Applying it twice returns the original text.
pub fn rot13(text: &ValidText) -> ValidText {
    let shifted: String = text.as_str().chars().map(shift_char).collect();
    ValidText::new_unchecked(shifted)
}

#[inline]
fn shift_char(c: char) -> char {
    if c == ' ' {
        return ' ';
    }
    let offset = c as u8 - b'A';
    char::from(b'A' + (offset + SHIFT) % ALPHABET_LEN)
}
