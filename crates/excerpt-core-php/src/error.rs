use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while tokenizing PHP source.
pub enum PhpLexError {
    #[error("unterminated string starting on line {line}")]
    /// A quoted or backtick string has no closing quote.
    UnterminatedString {
        /// Line of the opening quote.
        line: usize,
    },

    #[error("unterminated comment starting on line {line}")]
    /// A `/*` comment has no closing `*/`.
    UnterminatedComment {
        /// Line of the opening `/*`.
        line: usize,
    },

    #[error("unterminated heredoc '{label}' starting on line {line}")]
    /// A heredoc or nowdoc body never reaches its closing label.
    UnterminatedHeredoc {
        /// The closing label that was expected.
        label: String,
        /// Line of the `<<<` opener.
        line: usize,
    },

    #[error("unterminated interpolation starting on line {line}")]
    /// A `{$` or `${` expression inside a string is never closed.
    UnterminatedInterpolation {
        /// Line of the opening brace.
        line: usize,
    },
}

impl PhpLexError {
    /// Line on which the offending construct starts.
    pub fn line(&self) -> usize {
        match self {
            PhpLexError::UnterminatedString { line }
            | PhpLexError::UnterminatedComment { line }
            | PhpLexError::UnterminatedHeredoc { line, .. }
            | PhpLexError::UnterminatedInterpolation { line } => *line,
        }
    }
}
