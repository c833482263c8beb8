//! `excerpt-core-php` - PHP support for `excerpt-core`.
//!
//! This crate provides [`PhpLexer`], a [`Lexer`](excerpt_core::Lexer) for PHP source files
//! (including inline HTML around `<?php ... ?>` blocks), and the [`PhpHighlighter`] alias that
//! plugs it into [`Highlighter`].
//!
//! # Example
//!
//! ```rust
//! use excerpt_core_php::PhpHighlighter;
//!
//! let source = "<?php\n$a = Foo::bar();\n";
//! let html = PhpHighlighter::default().extract(source, 2, 1).unwrap();
//!
//! assert!(html.contains(r#"<span class="line highlighted"><span class="number">2</span>"#));
//! assert!(html.contains(r#"<span class="name class">Foo</span>"#));
//! assert!(html.contains(r#"<span class="name function">bar</span>"#));
//! ```

pub mod error;
pub mod lexer;

pub use error::PhpLexError;
pub use lexer::PhpLexer;

use excerpt_core::Highlighter;

/// A [`Highlighter`] over PHP source.
pub type PhpHighlighter = Highlighter<PhpLexer>;

/// Create a [`PhpHighlighter`].
pub fn highlighter() -> PhpHighlighter {
    Highlighter::new(PhpLexer)
}
