//! ROT13 cipher subsystem.
//!
//! # Data Flow
//! ```text
//! request text (&str)
//!     → validate.rs (alphabet check: non-empty, only ' ' and 'A'..='Z')
//!     → ValidText (invariant holds from here on)
//!     → rot13.rs (shift each letter by 13, keep spaces)
//!     → ValidText (still satisfies the invariant)
//! ```
//!
//! # Design Decisions
//! - `ValidText` can only be built by `validate` or `rot13`, so the transform
//!   never sees out-of-alphabet characters
//! - Both functions are pure: no I/O, no logging, no shared state

pub mod rot13;
pub mod validate;

pub use rot13::rot13;
pub use validate::{validate, ValidText, ValidationError};

/// Number of letters in the cipher alphabet.
pub const ALPHABET_LEN: u8 = 26;

/// Returns true if `c` belongs to the cipher alphabet `{' ', 'A'..='Z'}`.
#[inline]
pub fn in_alphabet(c: char) -> bool {
    c == ' ' || c.is_ascii_uppercase()
}
