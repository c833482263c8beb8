//! Line ending helpers.
//!
//! The engine works on LF (`'\n'`) newlines only. Sources using CRLF (`"\r\n"`) or lone CR are
//! normalized before they reach the lexer, so every line break is exactly one `'\n'` and line
//! numbers agree with what editors display.

use std::borrow::Cow;

/// Newline convention detected in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
    /// Classic Mac-style lone CR (`'\r'`).
    Cr,
}

impl LineEnding {
    /// Detect the line ending used by a source text.
    ///
    /// Policy: any CRLF wins, then any lone CR, otherwise LF.
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else if text.contains('\r') {
            Self::Cr
        } else {
            Self::Lf
        }
    }
}

/// Convert CRLF and lone CR line breaks to LF.
///
/// Borrows the input when it is already LF-only.
pub fn normalize_to_lf(text: &str) -> Cow<'_, str> {
    match LineEnding::detect_in_text(text) {
        LineEnding::Lf => Cow::Borrowed(text),
        LineEnding::Crlf | LineEnding::Cr => {
            Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
        }
    }
}
