//! Line-numbered markup output.
//!
//! [`Renderer`] accumulates classified tokens into [`OutputLine`]s, cutting at every embedded
//! newline. [`Excerpt::to_markup`] then serializes the lines, with edge markers, into the
//! `<samp class="source">` block.

use crate::classify::ClassifiedToken;
use crate::window::Window;
use serde::Serialize;
use std::fmt::Write as _;

/// One rendered source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    /// 1-based source line number.
    pub number: usize,
    /// Whether this is the focus line.
    pub highlighted: bool,
    /// Escaped markup for the line's tokens.
    pub content: String,
}

/// Placeholder rendered above or below the content lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMarker {
    /// More source exists beyond this edge.
    Ellipsis,
    /// The source ends (or starts) here.
    Spacer,
}

impl EdgeMarker {
    fn markup(self) -> &'static str {
        match self {
            EdgeMarker::Ellipsis => r#"<span class="line"><span class="number x">…</span></span>"#,
            EdgeMarker::Spacer => r#"<span class="line spacer"><span class="number x"></span></span>"#,
        }
    }
}

/// The structured result of rendering one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    /// Marker above the first line.
    pub leading: EdgeMarker,
    /// Content lines in order.
    pub lines: Vec<OutputLine>,
    /// Marker below the last line.
    pub trailing: EdgeMarker,
}

impl Excerpt {
    /// Serialize to the final markup block.
    pub fn to_markup(&self) -> String {
        let mut out = String::from(r#"<samp class="source">"#);
        out.push_str(self.leading.markup());
        for line in &self.lines {
            out.push('\n');
            let highlighted = if line.highlighted { " highlighted" } else { "" };
            let _ = write!(
                out,
                r#"<span class="line{highlighted}"><span class="number">{}</span>{}</span>"#,
                line.number, line.content
            );
        }
        out.push('\n');
        out.push_str(self.trailing.markup());
        out.push_str("</samp>");
        out
    }
}

/// Builds [`OutputLine`]s from classified tokens.
#[derive(Debug)]
pub struct Renderer {
    first_line: usize,
    focus_line: Option<usize>,
    lines: Vec<OutputLine>,
}

impl Renderer {
    /// Create a renderer numbering from the window's first line.
    pub fn new(window: &Window) -> Self {
        Self {
            first_line: window.first_line(),
            focus_line: window.focus_line,
            lines: Vec::new(),
        }
    }

    /// Append a token. Every newline in its text starts a new output line.
    ///
    /// The first token opens the first line even when its text is empty, so a window over a
    /// blank line still renders that line.
    pub fn push(&mut self, token: &ClassifiedToken) {
        if self.lines.is_empty() {
            self.open_line();
        }

        for (idx, part) in token.text.split('\n').enumerate() {
            if idx > 0 {
                self.open_line();
            }
            if part.is_empty() {
                continue;
            }
            let markup = wrap(token, part);
            if let Some(line) = self.lines.last_mut() {
                line.content.push_str(&markup);
            }
        }
    }

    /// Lines rendered so far.
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// Close the excerpt. `truncated` selects the trailing marker.
    pub fn finish(self, truncated: bool) -> Excerpt {
        Excerpt {
            leading: if self.first_line > 1 {
                EdgeMarker::Ellipsis
            } else {
                EdgeMarker::Spacer
            },
            lines: self.lines,
            trailing: if truncated {
                EdgeMarker::Ellipsis
            } else {
                EdgeMarker::Spacer
            },
        }
    }

    fn open_line(&mut self) {
        let number = self
            .lines
            .last()
            .map_or(self.first_line, |line| line.number + 1);
        self.lines.push(OutputLine {
            number,
            highlighted: self.focus_line == Some(number),
            content: String::new(),
        });
    }
}

fn wrap(token: &ClassifiedToken, part: &str) -> String {
    let Some(label) = token.label.as_deref() else {
        return escape_html(part);
    };

    let mut out = format!(r#"<span class="{}""#, escape_html(label));
    for (key, value) in &token.attributes {
        let _ = write!(out, r#" {key}="{}""#, escape_html(value));
    }
    let _ = write!(out, ">{}</span>", escape_html(part));
    out
}

/// Escape text for HTML element content and double- or single-quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}
