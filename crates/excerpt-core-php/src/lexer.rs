//! Hand-written PHP tokenizer.
//!
//! The scanner works on bytes and only ever cuts at ASCII positions, so every token text is a
//! valid `&str` slice of the input. Concatenating the texts of all tokens reproduces the input.

use crate::error::PhpLexError;
use excerpt_core::{Lexer, RawToken, TokenKind};
use std::num::IntErrorKind;
use tracing::{debug, warn};

/// Tokenizes PHP source into [`RawToken`]s.
///
/// Text outside `<?php ... ?>` is reported as [`TokenKind::InlineHtml`]. Strings, heredocs and
/// comments are checked for termination; anything else the grammar does not know becomes
/// [`TokenKind::Punct`] or [`TokenKind::BadCharacter`] rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpLexer;

impl PhpLexer {
    /// Create a lexer. Equivalent to [`PhpLexer::default`].
    pub fn new() -> Self {
        Self
    }
}

impl Lexer for PhpLexer {
    type Error = PhpLexError;

    fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, PhpLexError> {
        match Scanner::new(source).run() {
            Ok(tokens) => {
                debug!(tokens = tokens.len(), bytes = source.len(), "tokenized php source");
                Ok(tokens)
            }
            Err(err) => {
                warn!(error = %err, "php tokenization failed");
                Err(err)
            }
        }
    }
}

/// What ends an interpolated string body.
#[derive(Debug, Clone, Copy)]
enum Terminator<'a> {
    /// A closing `"` or `` ` ``.
    Quote(u8),
    /// A heredoc closing label at the start of a line.
    Heredoc(&'a str),
}

impl Terminator<'_> {
    fn unterminated(self, line: usize) -> PhpLexError {
        match self {
            Terminator::Quote(_) => PhpLexError::UnterminatedString { line },
            Terminator::Heredoc(label) => PhpLexError::UnterminatedHeredoc {
                label: label.to_string(),
                line,
            },
        }
    }
}

struct HeredocHeader<'a> {
    label: &'a str,
    nowdoc: bool,
    /// Byte offset just past the header's newline.
    end: usize,
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    in_php: bool,
    tokens: Vec<RawToken>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            in_php: false,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<RawToken>, PhpLexError> {
        while self.pos < self.bytes.len() {
            if !self.in_php {
                self.lex_inline_html();
                continue;
            }
            self.lex_token()?;
            if self.tokens.last().map(|t| t.kind) == Some(TokenKind::HaltCompiler) {
                self.lex_halt_compiler()?;
            }
        }
        Ok(self.tokens)
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Emit `pos..end` as one token and move past it.
    fn emit(&mut self, kind: TokenKind, end: usize) {
        let text = &self.src[self.pos..end];
        self.tokens.push(RawToken::new(kind, text, self.line));
        self.line += text.bytes().filter(|&b| b == b'\n').count();
        self.pos = end;
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn scan_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        let mut i = from;
        while i < self.bytes.len() && pred(self.bytes[i]) {
            i += 1;
        }
        i
    }

    fn previous_significant(&self) -> Option<TokenKind> {
        self.tokens.iter().rev().map(|t| t.kind).find(|kind| {
            !matches!(
                kind,
                TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
            )
        })
    }

    // ------------------------------------------------------------------
    // HTML mode
    // ------------------------------------------------------------------

    fn lex_inline_html(&mut self) {
        let mut search = self.pos;
        while let Some(offset) = find(&self.bytes[search..], b"<?") {
            let at = search + offset;
            if let Some((kind, end)) = self.open_tag_at(at) {
                if at > self.pos {
                    self.emit(TokenKind::InlineHtml, at);
                }
                self.emit(kind, end);
                self.in_php = true;
                return;
            }
            search = at + 2;
        }
        self.emit(TokenKind::InlineHtml, self.bytes.len());
    }

    fn open_tag_at(&self, at: usize) -> Option<(TokenKind, usize)> {
        let rest = &self.bytes[at + 2..];
        if rest.first() == Some(&b'=') {
            return Some((TokenKind::OpenTagWithEcho, at + 3));
        }
        if rest.len() >= 3 && rest[..3].eq_ignore_ascii_case(b"php") {
            return match rest.get(3) {
                None => Some((TokenKind::OpenTag, at + 5)),
                Some(&b) if is_space(b) => Some((TokenKind::OpenTag, at + 6)),
                Some(_) => None,
            };
        }
        None
    }

    /// Everything after `__halt_compiler();` is data.
    fn lex_halt_compiler(&mut self) -> Result<(), PhpLexError> {
        while self.pos < self.bytes.len() {
            self.lex_token()?;
            let done = self
                .tokens
                .last()
                .is_some_and(|t| t.is_punct(';') || t.kind == TokenKind::CloseTag);
            if done {
                break;
            }
        }
        if self.pos < self.bytes.len() {
            self.emit(TokenKind::InlineHtml, self.bytes.len());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // PHP mode
    // ------------------------------------------------------------------

    fn lex_token(&mut self) -> Result<(), PhpLexError> {
        let b = self.bytes[self.pos];
        let next = self.peek(1);

        if b == b'<'
            && let Some(header) = self.heredoc_header()
        {
            return self.lex_heredoc(header);
        }
        if b == b'('
            && let Some((kind, end)) = self.cast_at()
        {
            self.emit(kind, end);
            return Ok(());
        }

        match b {
            _ if is_space(b) => {
                let end = self.scan_while(self.pos, is_space);
                self.emit(TokenKind::Whitespace, end);
            }
            b'?' if next == Some(b'>') => self.lex_close_tag(),
            b'#' if next == Some(b'[') => self.emit(TokenKind::Attribute, self.pos + 2),
            b'#' => self.lex_line_comment(),
            b'/' if next == Some(b'/') => self.lex_line_comment(),
            b'/' if next == Some(b'*') => self.lex_block_comment()?,
            b'$' if next.is_some_and(is_ident_start) => {
                let end = self.scan_while(self.pos + 1, is_ident_continue);
                self.emit(TokenKind::Variable, end);
            }
            b'\'' => self.lex_single_quoted(0)?,
            b'"' => self.lex_double_quoted(0)?,
            b'b' | b'B' if next == Some(b'\'') => self.lex_single_quoted(1)?,
            b'b' | b'B' if next == Some(b'"') => self.lex_double_quoted(1)?,
            b'`' => self.lex_backtick()?,
            b'0'..=b'9' => self.lex_number(),
            b'.' if next.is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
            b'\\' => self.emit(TokenKind::NsSeparator, self.pos + 1),
            _ if is_ident_start(b) => self.lex_identifier(),
            _ => self.lex_operator(),
        }
        Ok(())
    }

    fn lex_close_tag(&mut self) {
        let mut end = self.pos + 2;
        if self.bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
        self.emit(TokenKind::CloseTag, end);
        self.in_php = false;
    }

    /// `//` and `#` comments run to the end of the line or a `?>`, whichever comes first.
    fn lex_line_comment(&mut self) {
        let mut end = self.pos;
        while end < self.bytes.len() {
            match self.bytes[end] {
                b'\n' => break,
                b'?' if self.bytes.get(end + 1) == Some(&b'>') => break,
                _ => end += 1,
            }
        }
        self.emit(TokenKind::Comment, end);
    }

    fn lex_block_comment(&mut self) -> Result<(), PhpLexError> {
        let Some(close) = find(&self.bytes[self.pos + 2..], b"*/") else {
            return Err(PhpLexError::UnterminatedComment { line: self.line });
        };
        let end = self.pos + 2 + close + 2;
        let doc = self.bytes[self.pos..].starts_with(b"/**")
            && self.bytes.get(self.pos + 3).is_some_and(|&b| is_space(b));
        let kind = if doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.emit(kind, end);
        Ok(())
    }

    fn cast_at(&self) -> Option<(TokenKind, usize)> {
        let start = self.scan_while(self.pos + 1, is_blank);
        let word_end = self.scan_while(start, |b| b.is_ascii_alphabetic());
        let end = self.scan_while(word_end, is_blank);
        if word_end == start || self.bytes.get(end) != Some(&b')') {
            return None;
        }
        let kind = match self.src[start..word_end].to_ascii_lowercase().as_str() {
            "int" | "integer" => TokenKind::IntCast,
            "bool" | "boolean" => TokenKind::BoolCast,
            "float" | "double" | "real" => TokenKind::DoubleCast,
            "string" | "binary" => TokenKind::StringCast,
            "array" => TokenKind::ArrayCast,
            "object" => TokenKind::ObjectCast,
            "unset" => TokenKind::UnsetCast,
            _ => return None,
        };
        Some((kind, end + 1))
    }

    fn lex_number(&mut self) {
        let bytes = self.bytes;
        let start = self.pos;
        let prefix = bytes
            .get(start + 1)
            .filter(|_| bytes[start] == b'0')
            .map(|b| b.to_ascii_lowercase());
        let radix = match prefix {
            Some(b'x') => 16,
            Some(b'b') => 2,
            Some(b'o') => 8,
            _ => 10,
        };

        if radix != 10 {
            let end = self.scan_while(start + 2, |b| {
                b == b'_' || char::from(b).is_digit(radix)
            });
            if end > start + 2 {
                let kind = integer_kind(&self.src[start + 2..end], radix);
                self.emit(kind, end);
                return;
            }
        }

        let mut end = self.scan_while(start, is_digit_or_underscore);
        let mut float = false;
        if bytes.get(end) == Some(&b'.') {
            float = true;
            end = self.scan_while(end + 1, is_digit_or_underscore);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                float = true;
                end = self.scan_while(exp, is_digit_or_underscore);
            }
        }

        let kind = if float {
            TokenKind::DNumber
        } else {
            let text = &self.src[start..end];
            if text.len() > 1 && text.starts_with('0') {
                integer_kind(&text[1..], 8)
            } else {
                integer_kind(text, 10)
            }
        };
        self.emit(kind, end);
    }

    fn lex_identifier(&mut self) {
        let end = self.scan_while(self.pos, is_ident_continue);
        let word = self.src[self.pos..end].to_ascii_lowercase();

        let mut kind = match self.previous_significant() {
            Some(prev)
                if prev.is_member_access()
                    || matches!(
                        prev,
                        TokenKind::NsSeparator | TokenKind::Function | TokenKind::Const
                    ) =>
            {
                TokenKind::Name
            }
            Some(TokenKind::PaamayimNekudotayim) if word != "class" => TokenKind::Name,
            _ => keyword(&word).unwrap_or(TokenKind::Name),
        };

        match kind {
            TokenKind::Yield => {
                if let Some(from_end) = self.yield_from_end(end) {
                    self.emit(TokenKind::YieldFrom, from_end);
                    return;
                }
            }
            TokenKind::Enum if !self.enum_declaration_follows(end) => kind = TokenKind::Name,
            _ => {}
        }
        self.emit(kind, end);
    }

    fn yield_from_end(&self, word_end: usize) -> Option<usize> {
        let gap_end = self.scan_while(word_end, is_blank);
        let rest = &self.bytes[gap_end..];
        let matched = gap_end > word_end
            && rest.len() >= 4
            && rest[..4].eq_ignore_ascii_case(b"from")
            && !rest.get(4).is_some_and(|&b| is_ident_continue(b));
        matched.then_some(gap_end + 4)
    }

    /// `enum` is only a keyword when a name follows it.
    fn enum_declaration_follows(&self, word_end: usize) -> bool {
        let gap_end = self.scan_while(word_end, is_space);
        gap_end > word_end && self.bytes.get(gap_end).is_some_and(|&b| is_ident_start(b))
    }

    fn lex_operator(&mut self) {
        let rest = &self.bytes[self.pos..];
        if let Some((op, kind)) = OPERATORS
            .iter()
            .find(|(op, _)| rest.starts_with(op.as_bytes()))
        {
            self.emit(*kind, self.pos + op.len());
            return;
        }
        let kind = if rest[0].is_ascii_punctuation() {
            TokenKind::Punct
        } else {
            TokenKind::BadCharacter
        };
        self.emit(kind, self.pos + 1);
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    /// Index of the `quote` closing a string body that starts at `from`.
    fn closing_quote(&self, from: usize, quote: u8) -> Option<usize> {
        let mut i = from;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b if b == quote => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    /// `prefix` is the length of a binary-string marker (`b`) before the opening quote.
    fn lex_single_quoted(&mut self, prefix: usize) -> Result<(), PhpLexError> {
        let open = self.pos + prefix;
        let close = self
            .closing_quote(open + 1, b'\'')
            .ok_or(PhpLexError::UnterminatedString { line: self.line })?;
        self.emit_plain_string(open, close);
        Ok(())
    }

    fn lex_double_quoted(&mut self, prefix: usize) -> Result<(), PhpLexError> {
        let line = self.line;
        let open = self.pos + prefix;
        let close = self
            .closing_quote(open + 1, b'"')
            .ok_or(PhpLexError::UnterminatedString { line })?;
        // Without interpolation markers before it, the first unescaped quote is the real end.
        if !has_interpolation(&self.bytes[open + 1..close]) {
            self.emit_plain_string(open, close);
            return Ok(());
        }
        self.emit(TokenKind::Punct, open + 1);
        self.lex_encapsed(Terminator::Quote(b'"'), line)?;
        self.emit(TokenKind::Punct, self.pos + 1);
        Ok(())
    }

    fn lex_backtick(&mut self) -> Result<(), PhpLexError> {
        let line = self.line;
        self.emit(TokenKind::Punct, self.pos + 1);
        self.lex_encapsed(Terminator::Quote(b'`'), line)?;
        self.emit(TokenKind::Punct, self.pos + 1);
        Ok(())
    }

    /// Emit a string without interpolation whose quotes are at `open` and `close`.
    ///
    /// A string spanning lines is broken into quote, body and quote so that the body can be
    /// split at window edges. Any prefix before `open` stays with the opening quote.
    fn emit_plain_string(&mut self, open: usize, close: usize) {
        if !self.bytes[open..close].contains(&b'\n') {
            self.emit(TokenKind::ConstantEncapsedString, close + 1);
            return;
        }
        self.emit(TokenKind::Punct, open + 1);
        self.emit(TokenKind::EncapsedAndWhitespace, close);
        self.emit(TokenKind::Punct, close + 1);
    }

    /// Lex an interpolated body up to (not including) its terminator.
    fn lex_encapsed(&mut self, term: Terminator<'a>, line: usize) -> Result<(), PhpLexError> {
        let mut i = self.pos;
        loop {
            if i >= self.bytes.len() {
                return Err(term.unterminated(line));
            }
            if let Terminator::Heredoc(label) = term
                && i > 0
                && self.bytes[i - 1] == b'\n'
                && self.heredoc_close_at(i, label).is_some()
            {
                self.flush_literal(i);
                return Ok(());
            }

            let next = self.bytes.get(i + 1).copied();
            match self.bytes[i] {
                b'\\' => i = (i + 2).min(self.bytes.len()),
                b if matches!(term, Terminator::Quote(q) if q == b) => {
                    self.flush_literal(i);
                    return Ok(());
                }
                b'$' if next.is_some_and(is_ident_start) => {
                    self.flush_literal(i);
                    self.lex_simple_interpolation();
                    i = self.pos;
                }
                b'$' if next == Some(b'{') => {
                    self.flush_literal(i);
                    self.lex_dollar_brace()?;
                    i = self.pos;
                }
                b'{' if next == Some(b'$') => {
                    self.flush_literal(i);
                    let line = self.line;
                    self.emit(TokenKind::CurlyOpen, self.pos + 1);
                    self.lex_embedded_code(line)?;
                    i = self.pos;
                }
                _ => i += 1,
            }
        }
    }

    fn flush_literal(&mut self, end: usize) {
        if end > self.pos {
            self.emit(TokenKind::EncapsedAndWhitespace, end);
        }
    }

    /// `$name`, optionally followed by one `[key]` or `->prop`.
    fn lex_simple_interpolation(&mut self) {
        let end = self.scan_while(self.pos + 1, is_ident_continue);
        self.emit(TokenKind::Variable, end);

        let rest = &self.bytes[self.pos..];
        if rest.starts_with(b"[") {
            self.lex_interpolated_offset();
        } else if rest.starts_with(b"->") && rest.get(2).is_some_and(|&b| is_ident_start(b)) {
            self.emit(TokenKind::ObjectOperator, self.pos + 2);
            let end = self.scan_while(self.pos, is_ident_continue);
            self.emit(TokenKind::Name, end);
        } else if rest.starts_with(b"?->") && rest.get(3).is_some_and(|&b| is_ident_start(b)) {
            self.emit(TokenKind::NullsafeObjectOperator, self.pos + 3);
            let end = self.scan_while(self.pos, is_ident_continue);
            self.emit(TokenKind::Name, end);
        }
    }

    /// `[0]`, `[-1]`, `[key]` or `[$var]` after an interpolated variable. Anything else is
    /// left in the literal.
    fn lex_interpolated_offset(&mut self) {
        let start = self.pos + 1;
        let key = match self.bytes.get(start) {
            Some(b'-' | b'0'..=b'9') => {
                let digits = if self.bytes[start] == b'-' { start + 1 } else { start };
                let end = self.scan_while(digits, |b| b.is_ascii_digit());
                (end > digits).then_some((TokenKind::NumString, end))
            }
            Some(b'$') if self.bytes.get(start + 1).is_some_and(|&b| is_ident_start(b)) => {
                Some((TokenKind::Variable, self.scan_while(start + 1, is_ident_continue)))
            }
            Some(&b) if is_ident_start(b) => {
                Some((TokenKind::Name, self.scan_while(start, is_ident_continue)))
            }
            _ => None,
        };
        let Some((kind, end)) = key else {
            return;
        };
        if self.bytes.get(end) != Some(&b']') {
            return;
        }
        self.emit(TokenKind::Punct, start);
        self.emit(kind, end);
        self.emit(TokenKind::Punct, end + 1);
    }

    /// `${name}` or `${expr}`.
    fn lex_dollar_brace(&mut self) -> Result<(), PhpLexError> {
        let line = self.line;
        self.emit(TokenKind::DollarOpenCurlyBraces, self.pos + 2);
        if self.peek(0).is_some_and(is_ident_start) {
            let end = self.scan_while(self.pos, is_ident_continue);
            if matches!(self.bytes.get(end), Some(b'[' | b'}')) {
                self.emit(TokenKind::StringVarname, end);
            }
        }
        self.lex_embedded_code(line)
    }

    /// PHP tokens up to and including the `}` that balances an already emitted opener.
    fn lex_embedded_code(&mut self, line: usize) -> Result<(), PhpLexError> {
        let mut depth = 1usize;
        loop {
            if self.pos >= self.bytes.len() || !self.in_php {
                return Err(PhpLexError::UnterminatedInterpolation { line });
            }
            self.lex_token()?;
            let Some(last) = self.tokens.last() else {
                continue;
            };
            if last.is_punct('{') {
                depth += 1;
            } else if last.is_punct('}') {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Heredoc / nowdoc
    // ------------------------------------------------------------------

    fn heredoc_header(&self) -> Option<HeredocHeader<'a>> {
        if !self.bytes[self.pos..].starts_with(b"<<<") {
            return None;
        }
        let mut i = self.scan_while(self.pos + 3, is_blank);
        let quote = match self.bytes.get(i) {
            Some(&q @ (b'\'' | b'"')) => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        if !self.bytes.get(i).is_some_and(|&b| is_ident_start(b)) {
            return None;
        }
        let label_end = self.scan_while(i, is_ident_continue);
        let src = self.src;
        let label = &src[i..label_end];

        let mut end = label_end;
        if let Some(q) = quote {
            if self.bytes.get(end) != Some(&q) {
                return None;
            }
            end += 1;
        }
        if self.bytes.get(end) != Some(&b'\n') {
            return None;
        }
        Some(HeredocHeader {
            label,
            nowdoc: quote == Some(b'\''),
            end: end + 1,
        })
    }

    fn lex_heredoc(&mut self, header: HeredocHeader<'a>) -> Result<(), PhpLexError> {
        let line = self.line;
        let unterminated = || PhpLexError::UnterminatedHeredoc {
            label: header.label.to_string(),
            line,
        };

        self.emit(TokenKind::StartHeredoc, header.end);
        if header.nowdoc {
            let close = self
                .find_heredoc_close(header.label)
                .ok_or_else(unterminated)?;
            self.flush_literal(close);
        } else {
            self.lex_encapsed(Terminator::Heredoc(header.label), line)?;
        }

        let end = self
            .heredoc_close_at(self.pos, header.label)
            .ok_or_else(unterminated)?;
        self.emit(TokenKind::EndHeredoc, end);
        Ok(())
    }

    /// Start of the first line, at or after the current position, that closes `label`.
    fn find_heredoc_close(&self, label: &str) -> Option<usize> {
        let mut i = self.pos;
        loop {
            if self.heredoc_close_at(i, label).is_some() {
                return Some(i);
            }
            i += find(&self.bytes[i..], b"\n")? + 1;
        }
    }

    /// If the line starting at `i` closes `label`, the offset just past the label.
    fn heredoc_close_at(&self, i: usize, label: &str) -> Option<usize> {
        let start = self.scan_while(i, is_blank);
        if !self.bytes[start..].starts_with(label.as_bytes()) {
            return None;
        }
        let end = start + label.len();
        if self.bytes.get(end).is_some_and(|&b| is_ident_continue(b)) {
            return None;
        }
        Some(end)
    }
}

/// Multi-character operators, longest first.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("===", TokenKind::IsIdentical),
    ("!==", TokenKind::IsNotIdentical),
    ("<=>", TokenKind::Spaceship),
    ("**=", TokenKind::PowEqual),
    ("...", TokenKind::Ellipsis),
    ("<<=", TokenKind::SlEqual),
    (">>=", TokenKind::SrEqual),
    ("??=", TokenKind::CoalesceEqual),
    ("?->", TokenKind::NullsafeObjectOperator),
    ("==", TokenKind::IsEqual),
    ("!=", TokenKind::IsNotEqual),
    ("<>", TokenKind::IsNotEqual),
    ("<=", TokenKind::IsSmallerOrEqual),
    (">=", TokenKind::IsGreaterOrEqual),
    ("&&", TokenKind::BooleanAnd),
    ("||", TokenKind::BooleanOr),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinusEqual),
    ("*=", TokenKind::MulEqual),
    ("/=", TokenKind::DivEqual),
    (".=", TokenKind::ConcatEqual),
    ("%=", TokenKind::ModEqual),
    ("&=", TokenKind::AndEqual),
    ("|=", TokenKind::OrEqual),
    ("^=", TokenKind::XorEqual),
    ("<<", TokenKind::Sl),
    (">>", TokenKind::Sr),
    ("??", TokenKind::Coalesce),
    ("->", TokenKind::ObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::PaamayimNekudotayim),
    ("**", TokenKind::Pow),
];

/// Case-folded reserved words.
fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "abstract" => TokenKind::Abstract,
        "array" => TokenKind::Array,
        "as" => TokenKind::As,
        "class" => TokenKind::Class,
        "clone" => TokenKind::Clone,
        "const" => TokenKind::Const,
        "declare" => TokenKind::Declare,
        "default" => TokenKind::Default,
        "echo" => TokenKind::Echo,
        "enddeclare" => TokenKind::EndDeclare,
        "enum" => TokenKind::Enum,
        "extends" => TokenKind::Extends,
        "final" => TokenKind::Final,
        "fn" => TokenKind::Fn,
        "function" => TokenKind::Function,
        "global" => TokenKind::Global,
        "implements" => TokenKind::Implements,
        "include" => TokenKind::Include,
        "include_once" => TokenKind::IncludeOnce,
        "instanceof" => TokenKind::InstanceOf,
        "insteadof" => TokenKind::InsteadOf,
        "interface" => TokenKind::Interface,
        "namespace" => TokenKind::Namespace,
        "new" => TokenKind::New,
        "print" => TokenKind::Print,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "public" => TokenKind::Public,
        "readonly" => TokenKind::Readonly,
        "require" => TokenKind::Require,
        "require_once" => TokenKind::RequireOnce,
        "static" => TokenKind::Static,
        "trait" => TokenKind::Trait,
        "use" => TokenKind::Use,
        "var" => TokenKind::Var,

        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "continue" => TokenKind::Continue,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "elseif" => TokenKind::ElseIf,
        "endfor" => TokenKind::EndFor,
        "endforeach" => TokenKind::EndForeach,
        "endif" => TokenKind::EndIf,
        "endswitch" => TokenKind::EndSwitch,
        "endwhile" => TokenKind::EndWhile,
        "exit" | "die" => TokenKind::Exit,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "foreach" => TokenKind::Foreach,
        "goto" => TokenKind::Goto,
        "if" => TokenKind::If,
        "match" => TokenKind::Match,
        "return" => TokenKind::Return,
        "switch" => TokenKind::Switch,
        "throw" => TokenKind::Throw,
        "try" => TokenKind::Try,
        "while" => TokenKind::While,
        "yield" => TokenKind::Yield,

        "callable" => TokenKind::Callable,
        "and" => TokenKind::LogicalAnd,
        "or" => TokenKind::LogicalOr,
        "xor" => TokenKind::LogicalXor,

        "empty" => TokenKind::Empty,
        "eval" => TokenKind::Eval,
        "__halt_compiler" => TokenKind::HaltCompiler,
        "isset" => TokenKind::Isset,
        "list" => TokenKind::List,
        "unset" => TokenKind::Unset,

        "__class__" => TokenKind::ClassC,
        "__dir__" => TokenKind::Dir,
        "__file__" => TokenKind::File,
        "__function__" => TokenKind::FuncC,
        "__line__" => TokenKind::Line,
        "__method__" => TokenKind::MethodC,
        "__namespace__" => TokenKind::NsC,
        "__trait__" => TokenKind::TraitC,
        _ => return None,
    };
    Some(kind)
}

fn integer_kind(digits: &str, radix: u32) -> TokenKind {
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    match i64::from_str_radix(&digits, radix) {
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => TokenKind::DNumber,
        _ => TokenKind::LNumber,
    }
}

/// Does a double-quoted body contain `$name`, `${` or `{$` outside an escape?
fn has_interpolation(body: &[u8]) -> bool {
    let mut i = 0;
    while i < body.len() {
        let next = body.get(i + 1).copied();
        match body[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'$' if next.is_some_and(|c| is_ident_start(c) || c == b'{') => return true,
            b'{' if next == Some(b'$') => return true,
            _ => {}
        }
        i += 1;
    }
    false
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

fn is_digit_or_underscore(b: u8) -> bool {
    b.is_ascii_digit() || b == b'_'
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use TokenKind::*;

    fn lex(source: &str) -> Vec<RawToken> {
        PhpLexer.tokenize(source).unwrap()
    }

    fn pairs(source: &str) -> Vec<(TokenKind, String)> {
        lex(source).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    fn expect(items: &[(TokenKind, &str)]) -> Vec<(TokenKind, String)> {
        items.iter().map(|(k, t)| (*k, t.to_string())).collect()
    }

    #[test]
    fn test_html_and_tags() {
        assert_eq!(
            pairs("<p>\n<?php echo 1; ?>\n<b>"),
            expect(&[
                (InlineHtml, "<p>\n"),
                (OpenTag, "<?php "),
                (Echo, "echo"),
                (Whitespace, " "),
                (LNumber, "1"),
                (Punct, ";"),
                (Whitespace, " "),
                (CloseTag, "?>\n"),
                (InlineHtml, "<b>"),
            ])
        );
        assert_eq!(
            pairs("<?= $x ?>"),
            expect(&[
                (OpenTagWithEcho, "<?="),
                (Whitespace, " "),
                (Variable, "$x"),
                (Whitespace, " "),
                (CloseTag, "?>"),
            ])
        );
        assert_eq!(pairs("<?xml version?>"), expect(&[(InlineHtml, "<?xml version?>")]));
    }

    #[test]
    fn test_statement() {
        assert_eq!(
            pairs("<?php $a = Foo::bar();"),
            expect(&[
                (OpenTag, "<?php "),
                (Variable, "$a"),
                (Whitespace, " "),
                (Punct, "="),
                (Whitespace, " "),
                (Name, "Foo"),
                (PaamayimNekudotayim, "::"),
                (Name, "bar"),
                (Punct, "("),
                (Punct, ")"),
                (Punct, ";"),
            ])
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = lex("<?php\n$a;\n\n/* x\ny */ $b;");
        let lines: Vec<(String, usize)> = tokens.into_iter().map(|t| (t.text, t.line)).collect();
        assert_eq!(
            lines,
            vec![
                ("<?php\n".to_string(), 1),
                ("$a".to_string(), 2),
                (";".to_string(), 2),
                ("\n\n".to_string(), 2),
                ("/* x\ny */".to_string(), 4),
                (" ".to_string(), 5),
                ("$b".to_string(), 5),
                (";".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_contextual() {
        assert_eq!(
            pairs("<?php NEW Foo; $x->list; Foo::class; Foo::new; function print() {}"),
            expect(&[
                (OpenTag, "<?php "),
                (New, "NEW"),
                (Whitespace, " "),
                (Name, "Foo"),
                (Punct, ";"),
                (Whitespace, " "),
                (Variable, "$x"),
                (ObjectOperator, "->"),
                (Name, "list"),
                (Punct, ";"),
                (Whitespace, " "),
                (Name, "Foo"),
                (PaamayimNekudotayim, "::"),
                (Class, "class"),
                (Punct, ";"),
                (Whitespace, " "),
                (Name, "Foo"),
                (PaamayimNekudotayim, "::"),
                (Name, "new"),
                (Punct, ";"),
                (Whitespace, " "),
                (Function, "function"),
                (Whitespace, " "),
                (Name, "print"),
                (Punct, "("),
                (Punct, ")"),
                (Whitespace, " "),
                (Punct, "{"),
                (Punct, "}"),
            ])
        );
    }

    #[test]
    fn test_yield_from_and_enum() {
        assert_eq!(
            pairs("<?php yield  from $g; enum Suit {} enum;"),
            expect(&[
                (OpenTag, "<?php "),
                (YieldFrom, "yield  from"),
                (Whitespace, " "),
                (Variable, "$g"),
                (Punct, ";"),
                (Whitespace, " "),
                (Enum, "enum"),
                (Whitespace, " "),
                (Name, "Suit"),
                (Whitespace, " "),
                (Punct, "{"),
                (Punct, "}"),
                (Whitespace, " "),
                (Name, "enum"),
                (Punct, ";"),
            ])
        );
    }

    #[test]
    fn test_casts_and_operators() {
        assert_eq!(
            pairs("<?php (int)$a ?? ( string )$b <=> $c?->d;"),
            expect(&[
                (OpenTag, "<?php "),
                (IntCast, "(int)"),
                (Variable, "$a"),
                (Whitespace, " "),
                (Coalesce, "??"),
                (Whitespace, " "),
                (StringCast, "( string )"),
                (Variable, "$b"),
                (Whitespace, " "),
                (Spaceship, "<=>"),
                (Whitespace, " "),
                (Variable, "$c"),
                (NullsafeObjectOperator, "?->"),
                (Name, "d"),
                (Punct, ";"),
            ])
        );
    }

    #[test]
    fn test_numbers() {
        let kinds: Vec<(TokenKind, String)> = pairs(
            "<?php 0x1F 0b101 0o17 017 1_000 1.5 .5 1e3 9223372036854775807 9223372036854775808",
        )
        .into_iter()
        .filter(|(kind, _)| *kind != Whitespace && *kind != OpenTag)
        .collect();
        assert_eq!(
            kinds,
            expect(&[
                (LNumber, "0x1F"),
                (LNumber, "0b101"),
                (LNumber, "0o17"),
                (LNumber, "017"),
                (LNumber, "1_000"),
                (DNumber, "1.5"),
                (DNumber, ".5"),
                (DNumber, "1e3"),
                (LNumber, "9223372036854775807"),
                (DNumber, "9223372036854775808"),
            ])
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            pairs("<?php // a ?> b"),
            expect(&[
                (OpenTag, "<?php "),
                (Comment, "// a "),
                (CloseTag, "?>"),
                (InlineHtml, " b"),
            ])
        );
        assert_eq!(
            pairs("<?php # x\n/** doc */ /**/ #[Attr]"),
            expect(&[
                (OpenTag, "<?php "),
                (Comment, "# x"),
                (Whitespace, "\n"),
                (DocComment, "/** doc */"),
                (Whitespace, " "),
                (Comment, "/**/"),
                (Whitespace, " "),
                (Attribute, "#["),
                (Name, "Attr"),
                (Punct, "]"),
            ])
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            pairs(r#"<?php 'it\'s' "a\"b" "$""#),
            expect(&[
                (OpenTag, "<?php "),
                (ConstantEncapsedString, r"'it\'s'"),
                (Whitespace, " "),
                (ConstantEncapsedString, r#""a\"b""#),
                (Whitespace, " "),
                (ConstantEncapsedString, r#""$""#),
            ])
        );
        assert_eq!(
            pairs("<?php 'a\nb';"),
            expect(&[
                (OpenTag, "<?php "),
                (Punct, "'"),
                (EncapsedAndWhitespace, "a\nb"),
                (Punct, "'"),
                (Punct, ";"),
            ])
        );
    }

    #[test]
    fn test_binary_string_prefix() {
        assert_eq!(
            pairs(r#"<?php b'x' B"y" b"$z";"#),
            expect(&[
                (OpenTag, "<?php "),
                (ConstantEncapsedString, "b'x'"),
                (Whitespace, " "),
                (ConstantEncapsedString, r#"B"y""#),
                (Whitespace, " "),
                (Punct, "b\""),
                (Variable, "$z"),
                (Punct, "\""),
                (Punct, ";"),
            ])
        );
        assert_eq!(
            pairs("<?php b'a\nb'; $b;"),
            expect(&[
                (OpenTag, "<?php "),
                (Punct, "b'"),
                (EncapsedAndWhitespace, "a\nb"),
                (Punct, "'"),
                (Punct, ";"),
                (Whitespace, " "),
                (Variable, "$b"),
                (Punct, ";"),
            ])
        );
        assert_eq!(pairs("<?php bar;")[1], (Name, "bar".to_string()));
    }

    #[test]
    fn test_interpolation() {
        assert_eq!(
            pairs(r#"<?php "a $b[0] {$c->d} ${e}";"#),
            expect(&[
                (OpenTag, "<?php "),
                (Punct, "\""),
                (EncapsedAndWhitespace, "a "),
                (Variable, "$b"),
                (Punct, "["),
                (NumString, "0"),
                (Punct, "]"),
                (EncapsedAndWhitespace, " "),
                (CurlyOpen, "{"),
                (Variable, "$c"),
                (ObjectOperator, "->"),
                (Name, "d"),
                (Punct, "}"),
                (EncapsedAndWhitespace, " "),
                (DollarOpenCurlyBraces, "${"),
                (StringVarname, "e"),
                (Punct, "}"),
                (Punct, "\""),
                (Punct, ";"),
            ])
        );
    }

    #[test]
    fn test_nested_quotes_inside_interpolation() {
        assert_eq!(
            pairs(r#"<?php "x{$a["k"]}y";"#),
            expect(&[
                (OpenTag, "<?php "),
                (Punct, "\""),
                (EncapsedAndWhitespace, "x"),
                (CurlyOpen, "{"),
                (Variable, "$a"),
                (Punct, "["),
                (ConstantEncapsedString, r#""k""#),
                (Punct, "]"),
                (Punct, "}"),
                (EncapsedAndWhitespace, "y"),
                (Punct, "\""),
                (Punct, ";"),
            ])
        );
    }

    #[test]
    fn test_heredoc() {
        assert_eq!(
            pairs("<?php\n$x = <<<EOT\nHi $name\n  EOT;\n"),
            expect(&[
                (OpenTag, "<?php\n"),
                (Variable, "$x"),
                (Whitespace, " "),
                (Punct, "="),
                (Whitespace, " "),
                (StartHeredoc, "<<<EOT\n"),
                (EncapsedAndWhitespace, "Hi "),
                (Variable, "$name"),
                (EncapsedAndWhitespace, "\n"),
                (EndHeredoc, "  EOT"),
                (Punct, ";"),
                (Whitespace, "\n"),
            ])
        );
    }

    #[test]
    fn test_nowdoc() {
        assert_eq!(
            pairs("<?php <<<'EOT'\nraw $x\nEOTX\nEOT\n"),
            expect(&[
                (OpenTag, "<?php "),
                (StartHeredoc, "<<<'EOT'\n"),
                (EncapsedAndWhitespace, "raw $x\nEOTX\n"),
                (EndHeredoc, "EOT"),
                (Whitespace, "\n"),
            ])
        );
    }

    #[test]
    fn test_halt_compiler() {
        assert_eq!(
            pairs("<?php __halt_compiler(); <?php $raw"),
            expect(&[
                (OpenTag, "<?php "),
                (HaltCompiler, "__halt_compiler"),
                (Punct, "("),
                (Punct, ")"),
                (Punct, ";"),
                (InlineHtml, " <?php $raw"),
            ])
        );
    }

    #[test]
    fn test_errors_carry_start_line() {
        assert_eq!(
            PhpLexer.tokenize("<?php\n\n'abc"),
            Err(PhpLexError::UnterminatedString { line: 3 })
        );
        assert_eq!(
            PhpLexer.tokenize("<?php\n/* open"),
            Err(PhpLexError::UnterminatedComment { line: 2 })
        );
        assert_eq!(
            PhpLexer.tokenize("<?php <<<EOT\nbody\n"),
            Err(PhpLexError::UnterminatedHeredoc {
                label: "EOT".to_string(),
                line: 1,
            })
        );
        assert_eq!(
            PhpLexer.tokenize("<?php `ls {$a"),
            Err(PhpLexError::UnterminatedInterpolation { line: 1 })
        );
    }

    #[test]
    fn test_texts_reassemble_source_and_stay_on_one_line() {
        let source = concat!(
            "<html>\n<?php\n",
            "namespace App\\Http;\n",
            "/**\n * Doc.\n */\n",
            "final class A extends \\Base implements I {\n",
            "    public function run(?int $n = null): static {\n",
            "        $s = \"multi\nline $n\";\n",
            "        $t = <<<TXT\n  {$this->x} é\n  TXT;\n",
            "        return $this?->go(...) ?? MY_CONST;\n",
            "    }\n}\n?>\n</html>\n",
        );
        let tokens = lex(source);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, source);

        for token in &tokens {
            if !token.kind.is_splittable() {
                assert!(!token.text.contains('\n'), "{token:?} spans lines");
            }
        }
    }
}
