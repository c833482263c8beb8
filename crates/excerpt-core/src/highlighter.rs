//! Public entry points.

use crate::classify::classify;
use crate::line_ending::normalize_to_lf;
use crate::render::{Excerpt, Renderer};
use crate::token::{Lexer, RawToken};
use crate::window::{Window, Windower};
use std::path::Path;
use tracing::{debug, warn};

/// Default number of context lines either side of the focus line for `extract`.
pub const DEFAULT_BUFFER: usize = 8;
/// Upper bound for the `extract` buffer.
pub const MAX_BUFFER: usize = 30;

const STYLESHEET: &str = include_str!("../resources/styles.css");

/// Renders windows of source text through a [`Lexer`].
///
/// A `Highlighter` holds no state between calls; one instance can serve any number of
/// independent requests.
#[derive(Debug, Clone, Default)]
pub struct Highlighter<L> {
    lexer: L,
}

impl<L: Lexer> Highlighter<L> {
    /// Create a highlighter backed by `lexer`.
    pub fn new(lexer: L) -> Self {
        Self { lexer }
    }

    /// The underlying lexer.
    pub fn lexer(&self) -> &L {
        &self.lexer
    }

    /// Render `window` of `source` into its structured form.
    pub fn render(&self, source: &str, window: Window) -> Result<Excerpt, L::Error> {
        let window = window.normalized();
        let source = normalize_to_lf(source);
        let tokens = self.lexer.tokenize(&source)?;
        debug!(tokens = tokens.len(), ?window, "rendering excerpt");
        Ok(render_tokens(tokens, window))
    }

    /// Render `window` of `source` as markup.
    pub fn highlight(&self, source: &str, window: Window) -> Result<String, L::Error> {
        Ok(self.render(source, window)?.to_markup())
    }

    /// Render `buffer` lines either side of `line`, highlighting `line`.
    ///
    /// `buffer` is clamped into `1..=MAX_BUFFER`, `line` to at least 1.
    pub fn extract(&self, source: &str, line: usize, buffer: usize) -> Result<String, L::Error> {
        self.highlight(source, Window::around(line, buffer, MAX_BUFFER))
    }

    /// [`Highlighter::highlight`] on a file's contents.
    ///
    /// A missing or unreadable file yields an empty string rather than an error.
    pub fn highlight_file(
        &self,
        path: impl AsRef<Path>,
        window: Window,
    ) -> Result<String, L::Error> {
        match read_source(path.as_ref()) {
            Some(source) => self.highlight(&source, window),
            None => Ok(String::new()),
        }
    }

    /// [`Highlighter::extract`] on a file's contents.
    ///
    /// A missing or unreadable file yields an empty string rather than an error.
    pub fn extract_file(
        &self,
        path: impl AsRef<Path>,
        line: usize,
        buffer: usize,
    ) -> Result<String, L::Error> {
        match read_source(path.as_ref()) {
            Some(source) => self.extract(&source, line, buffer),
            None => Ok(String::new()),
        }
    }
}

impl<L> Highlighter<L> {
    /// The bundled stylesheet for the markup's class vocabulary.
    pub fn stylesheet() -> &'static str {
        STYLESHEET
    }

    /// The bundled stylesheet wrapped in a `<style>` element.
    pub fn export_inline_styles() -> String {
        format!("<style>\n{STYLESHEET}\n</style>")
    }
}

/// Run the window, classify and render stages over an already lexed token list.
///
/// `window` is normalized (see [`Window::normalized`]) before use.
pub fn render_tokens(tokens: Vec<RawToken>, window: Window) -> Excerpt {
    let mut windower = Windower::new(tokens, window);
    let mut renderer = Renderer::new(windower.window());

    while let Some(token) = windower.next_token() {
        let classified = classify(token, windower.history(), windower.lookahead());
        renderer.push(&classified);
    }

    renderer.finish(windower.is_truncated())
}

fn read_source(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read source file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use std::convert::Infallible;

    /// Splits on spaces and newlines; enough to drive the pipeline without a real grammar.
    struct WordLexer;

    impl Lexer for WordLexer {
        type Error = Infallible;

        fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, Self::Error> {
            let mut tokens = Vec::new();
            let mut line = 1;
            let mut word = String::new();
            let mut word_line = 1;
            for ch in source.chars() {
                if ch == ' ' || ch == '\n' {
                    if !word.is_empty() {
                        let word = std::mem::take(&mut word);
                        tokens.push(RawToken::new(TokenKind::Name, word, word_line));
                    }
                    tokens.push(RawToken::new(TokenKind::Whitespace, ch.to_string(), line));
                    if ch == '\n' {
                        line += 1;
                    }
                } else {
                    if word.is_empty() {
                        word_line = line;
                    }
                    word.push(ch);
                }
            }
            if !word.is_empty() {
                tokens.push(RawToken::new(TokenKind::Name, word, word_line));
            }
            Ok(tokens)
        }
    }

    fn numbers(excerpt: &Excerpt) -> Vec<usize> {
        excerpt.lines.iter().map(|l| l.number).collect()
    }

    #[test]
    fn test_extract_window_bounds() {
        let source: Vec<String> = (1..=40).map(|i| format!("w{i}")).collect();
        let source = source.join("\n");
        let highlighter = Highlighter::new(WordLexer);

        let excerpt = highlighter
            .render(&source, Window::around(20, 3, MAX_BUFFER))
            .unwrap();
        assert_eq!(numbers(&excerpt), (17..=23).collect::<Vec<_>>());
        assert!(excerpt.lines.iter().filter(|l| l.highlighted).all(|l| l.number == 20));

        let excerpt = highlighter.render(&source, Window::around(2, 3, MAX_BUFFER)).unwrap();
        assert_eq!(numbers(&excerpt), (1..=5).collect::<Vec<_>>());

        let excerpt = highlighter.render(&source, Window::around(39, 3, MAX_BUFFER)).unwrap();
        assert_eq!(numbers(&excerpt), (36..=40).collect::<Vec<_>>());
    }

    #[test]
    fn test_crlf_source_matches_lf() {
        let highlighter = Highlighter::new(WordLexer);
        let lf = highlighter.highlight("a b\nc\nd", Window::lines(2, 3)).unwrap();
        let crlf = highlighter.highlight("a b\r\nc\r\nd", Window::lines(2, 3)).unwrap();
        assert_eq!(lf, crlf);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let highlighter = Highlighter::new(WordLexer);
        let out = highlighter
            .highlight_file("/definitely/not/here.php", Window::full())
            .unwrap();
        assert_eq!(out, "");
        let out = highlighter.extract_file("/definitely/not/here.php", 3, 8).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_inline_styles_wrap_stylesheet() {
        let styles = Highlighter::<WordLexer>::export_inline_styles();
        assert!(styles.starts_with("<style>\n"));
        assert!(styles.ends_with("\n</style>"));
        assert!(styles.contains(".highlighted"));
    }
}
