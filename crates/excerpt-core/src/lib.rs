//! `excerpt-core` - line-windowed, semantically-labeled source excerpts.
//!
//! # Overview
//!
//! Given a source text and a line window ("lines 40–56, highlight 48"), `excerpt-core` produces
//! a self-contained HTML block in which every token carries a stable class list and every line
//! carries its number. It is meant for diagnostic and documentation views that show a slice of a
//! file around some point of interest.
//!
//! Tokenization is delegated to a [`Lexer`] implementation (see `excerpt-core-php` for the
//! bundled PHP lexer); this crate only consumes the token list.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Lexer        │ → │ Windower     │ → │ Classifier   │ → │ Renderer     │
//! │ (external)   │   │ split/filter │   │ + History    │   │ lines/markup │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! - [`Windower`] consumes tokens once, splitting multi-line tokens at window edges and stopping
//!   past the last line.
//! - [`classify()`] maps each surviving token to a label, disambiguating bare identifiers with the
//!   bounded [`History`] and the unconsumed lookahead.
//! - [`Renderer`] groups labeled pieces into numbered [`OutputLine`]s.
//!
//! # Quick Start
//!
//! ```rust
//! use excerpt_core::{Highlighter, Lexer, RawToken, TokenKind, Window};
//! use std::convert::Infallible;
//!
//! struct OneToken;
//!
//! impl Lexer for OneToken {
//!     type Error = Infallible;
//!
//!     fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, Infallible> {
//!         Ok(vec![RawToken::new(TokenKind::InlineHtml, source, 1)])
//!     }
//! }
//!
//! let highlighter = Highlighter::new(OneToken);
//! let html = highlighter.highlight("a\nb\nc", Window::lines(2, 2)).unwrap();
//! assert!(html.contains(r#"<span class="number">2</span><span class="html">b</span>"#));
//! ```
//!
//! # Module Description
//!
//! - [`token`] - raw tokens, token kinds and the [`Lexer`] seam
//! - [`history`] - bounded newest-first token history
//! - [`window`] - line windows and the windowing driver
//! - [`mod@classify`] - label table and name disambiguation
//! - [`render`] - output lines, edge markers and markup
//! - [`line_ending`] - newline normalization

pub mod classify;
pub mod highlighter;
pub mod history;
pub mod line_ending;
pub mod render;
pub mod token;
pub mod window;

pub use classify::{ClassifiedToken, NameContext, NameRole, base_label, classify};
pub use highlighter::{DEFAULT_BUFFER, Highlighter, MAX_BUFFER, render_tokens};
pub use history::{HISTORY_CAPACITY, History};
pub use line_ending::{LineEnding, normalize_to_lf};
pub use render::{EdgeMarker, Excerpt, OutputLine, Renderer, escape_html};
pub use token::{Lexer, RawToken, TokenKind};
pub use window::{Window, Windower};
