//! Line windows and the windowing token driver.
//!
//! [`Windower`] walks the lexer's token list once, front to back. Tokens that may carry
//! embedded newlines are split at the first newline so that each piece belongs to exactly one
//! line; the remainder goes back to the front of the queue. Pieces before the window are
//! dropped (but still recorded in the [`History`]), and the walk stops at the first piece past
//! the window's end.

use crate::history::History;
use crate::token::RawToken;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// An inclusive line range to render, with an optional line to highlight.
///
/// All line numbers are 1-based. `None` means "unbounded" for the range ends and "nothing
/// highlighted" for the focus line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// First line to render.
    pub start_line: Option<usize>,
    /// Last line to render.
    pub end_line: Option<usize>,
    /// Line to mark as highlighted.
    pub focus_line: Option<usize>,
}

impl Window {
    /// The whole source, nothing highlighted.
    pub fn full() -> Self {
        Self::default()
    }

    /// Lines `start..=end`.
    pub fn lines(start: usize, end: usize) -> Self {
        Self {
            start_line: Some(start),
            end_line: Some(end),
            focus_line: None,
        }
    }

    /// Everything from `start` to the end of the source.
    pub fn from_line(start: usize) -> Self {
        Self {
            start_line: Some(start),
            end_line: None,
            focus_line: None,
        }
    }

    /// `buffer` lines either side of `center`, with `center` highlighted.
    ///
    /// `buffer` is clamped into `1..=max_buffer` and `center` to at least 1.
    pub fn around(center: usize, buffer: usize, max_buffer: usize) -> Self {
        let center = center.max(1);
        let buffer = buffer.clamp(1, max_buffer.max(1));
        Self {
            start_line: Some(center.saturating_sub(buffer).max(1)),
            end_line: Some(center.saturating_add(buffer)),
            focus_line: Some(center),
        }
    }

    /// Highlight `line`.
    pub fn with_focus(mut self, line: usize) -> Self {
        self.focus_line = Some(line);
        self
    }

    /// Apply defaulting and clamping.
    ///
    /// - an explicit start line is clamped to at least 1
    /// - an end line without a start line implies a start line of 1
    pub fn normalized(self) -> Self {
        let start_line = match (self.start_line, self.end_line) {
            (Some(start), _) => Some(start.max(1)),
            (None, Some(_)) => Some(1),
            (None, None) => None,
        };
        Self {
            start_line,
            end_line: self.end_line,
            focus_line: self.focus_line,
        }
    }

    /// Whether line filtering (and therefore token splitting) applies.
    pub fn is_active(&self) -> bool {
        self.start_line.is_some()
    }

    /// Returns `true` if the end line precedes the start line.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start_line, self.end_line), (Some(start), Some(end)) if end < start)
    }

    /// The number given to the first rendered line.
    pub fn first_line(&self) -> usize {
        self.start_line.unwrap_or(1)
    }
}

/// Drives token consumption for one window.
#[derive(Debug)]
pub struct Windower {
    window: Window,
    pending: VecDeque<RawToken>,
    history: History,
    truncated: bool,
    finished: bool,
}

impl Windower {
    /// Create a driver over a full token list. `window` is normalized first.
    pub fn new(tokens: Vec<RawToken>, window: Window) -> Self {
        let window = window.normalized();
        let finished = window.is_inverted();
        if finished {
            debug!(?window, "inverted window yields no lines");
        }
        Self {
            window,
            pending: tokens.into(),
            history: History::new(),
            truncated: false,
            finished,
        }
    }

    /// The window being rendered.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Recently consumed tokens, newest first. The newest entry is the token most recently
    /// returned by [`Windower::next_token`].
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Tokens not yet consumed, including any re-injected split remainder at the front.
    pub fn lookahead(&self) -> &VecDeque<RawToken> {
        &self.pending
    }

    /// Whether the walk stopped at the end line with more source left behind it.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Return the next token (or token piece) that falls inside the window.
    pub fn next_token(&mut self) -> Option<RawToken> {
        if self.finished {
            return None;
        }

        while let Some(mut token) = self.pending.pop_front() {
            self.history.push(token.clone());

            // Splitting never changes the line of the kept piece, so a token past the end
            // line can be rejected before it is split.
            if self.window.end_line.is_some_and(|end| token.line > end) {
                // A single trailing newline at EOF is not "more source".
                self.truncated = !(token.text == "\n" && self.pending.is_empty());
                self.finished = true;
                debug!(
                    line = token.line,
                    truncated = self.truncated,
                    "stopped past end of window"
                );
                return None;
            }

            if self.window.is_active() && token.kind.is_splittable() {
                self.split(&mut token);
            }

            if self.window.start_line.is_some_and(|start| token.line < start) {
                continue;
            }

            return Some(token);
        }

        self.finished = true;
        None
    }

    /// Cut `token` at its first newline and queue the rest as a token on the next line.
    ///
    /// On or past the end line the newline travels with the remainder, so the visible piece
    /// never ends the last line. Elsewhere the newline stays with the piece it terminates.
    fn split(&mut self, token: &mut RawToken) {
        let Some(newline) = token.text.find('\n') else {
            return;
        };

        let at_or_past_end = self.window.end_line.is_some_and(|end| token.line >= end);
        let cut = if at_or_past_end { newline } else { newline + 1 };
        let rest = token.text.split_off(cut);
        if rest.is_empty() {
            return;
        }

        trace!(
            kind = token.kind.name(),
            line = token.line,
            kept = token.text.len(),
            rest = rest.len(),
            "split token"
        );
        self.pending.push_front(token.remainder(rest));
    }
}
