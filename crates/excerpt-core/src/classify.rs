//! Semantic labels for raw tokens.
//!
//! Every [`TokenKind`] maps to a fixed class string through [`base_label`]. Bare identifiers
//! ([`TokenKind::Name`]) are refined further by [`NameContext`], which looks at the next two
//! unconsumed tokens and scans the [`History`] backwards.
//!
//! The refinement is a best-effort heuristic over a bounded window of context, not a parse.
//! When nothing matches, a name keeps the plain `name` label.

use crate::history::History;
use crate::token::{RawToken, TokenKind};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static CONSTANT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    // Letters and underscores only; digits push a name back to "plain".
    Regex::new(r"^[A-Z_]+$").expect("constant-name pattern is valid")
});

/// A token ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedToken {
    /// Space-separated class list; `None` means the text is emitted without a wrapper.
    pub label: Option<String>,
    /// Extra attributes for the wrapper, in emission order.
    pub attributes: Vec<(&'static str, String)>,
    /// Text to display. May contain newlines.
    pub text: String,
}

impl ClassifiedToken {
    fn raw(text: String) -> Self {
        Self {
            label: None,
            attributes: Vec::new(),
            text,
        }
    }

    fn labeled(label: impl Into<String>, text: String) -> Self {
        Self {
            label: Some(label.into()),
            attributes: Vec::new(),
            text,
        }
    }
}

/// Classify one surviving token.
///
/// `history` must have the token itself as its newest entry (which is how
/// [`Windower`](crate::Windower) leaves it); `lookahead` is the unconsumed queue.
pub fn classify(
    token: RawToken,
    history: &History,
    lookahead: &VecDeque<RawToken>,
) -> ClassifiedToken {
    let label = base_label(token.kind);

    match token.kind {
        TokenKind::Whitespace => ClassifiedToken::raw(token.text),
        TokenKind::ConstantEncapsedString => classify_string(label, token.text),
        TokenKind::Variable if token.text == "$this" => {
            ClassifiedToken::labeled(format!("{label} this"), token.text)
        }
        TokenKind::Name => {
            let previous = history.iter().skip(1);
            let next = [lookahead.front(), lookahead.get(1)];
            match NameContext::resolve(&token.text, previous, next) {
                Some(role) => {
                    ClassifiedToken::labeled(format!("{label} {}", role.as_str()), token.text)
                }
                None => ClassifiedToken::labeled(label, token.text),
            }
        }
        _ => ClassifiedToken::labeled(label, token.text),
    }
}

fn classify_string(label: &'static str, text: String) -> ClassifiedToken {
    // PHP binary strings carry a `b` before the opening quote.
    let (prefix, body) = match text.strip_prefix(['b', 'B']) {
        Some(rest) if rest.starts_with(['\'', '"']) => text.split_at(1),
        _ => ("", text.as_str()),
    };
    let mut chars = body.chars();
    let Some(quote) = chars.next() else {
        return ClassifiedToken::labeled(label, text);
    };
    let inner = chars.as_str();
    let inner = inner.strip_suffix(quote).unwrap_or(inner);

    let mut attributes = vec![("data-quote", quote.to_string())];
    if !prefix.is_empty() {
        attributes.push(("data-prefix", prefix.to_string()));
    }
    ClassifiedToken {
        label: Some(label.to_string()),
        attributes,
        text: inner.to_string(),
    }
}

/// What a bare identifier turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Property or method reached through `->`.
    Member,
    /// A class reference.
    Class,
    /// A namespace path segment.
    Namespace,
    /// A constant.
    Constant,
    /// A function call or declaration.
    Function,
    /// A class used as a return type.
    ClassReturn,
}

impl NameRole {
    /// The class suffix appended after `name`.
    pub fn as_str(self) -> &'static str {
        match self {
            NameRole::Null => "null",
            NameRole::Bool => "bool",
            NameRole::Member => "member",
            NameRole::Class => "class",
            NameRole::Namespace => "namespace",
            NameRole::Constant => "constant",
            NameRole::Function => "function",
            NameRole::ClassReturn => "class return",
        }
    }
}

/// Pending hints gathered from lookahead, consumed by the backward scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameContext {
    /// An opening parenthesis follows the name.
    pub maybe_function: bool,
    /// Whitespace and then an opening brace follow the name.
    pub maybe_class_return: bool,
}

impl NameContext {
    /// Run the full disambiguation for a name token.
    ///
    /// `previous` yields earlier tokens newest-first, excluding the name itself. `next` holds
    /// the two tokens after it, if any.
    pub fn resolve<'a>(
        text: &str,
        previous: impl IntoIterator<Item = &'a RawToken>,
        next: [Option<&RawToken>; 2],
    ) -> Option<NameRole> {
        if let Some(role) = Self::literal(text) {
            return Some(role);
        }

        let mut context = Self::default();
        if let Some(role) = context.look_ahead(next) {
            return Some(role);
        }

        if !context.maybe_function && CONSTANT_NAME.is_match(text) {
            return Some(NameRole::Constant);
        }

        context.look_behind(previous, next)
    }

    /// Keyword-like literals.
    pub fn literal(text: &str) -> Option<NameRole> {
        match text {
            "null" => Some(NameRole::Null),
            "true" | "false" => Some(NameRole::Bool),
            _ => None,
        }
    }

    /// Decide from the following tokens, or record a hint for [`NameContext::look_behind`].
    pub fn look_ahead(&mut self, next: [Option<&RawToken>; 2]) -> Option<NameRole> {
        let [first, second] = next;
        let first = first?;

        match first.kind {
            kind if kind.is_member_access() => return Some(NameRole::Member),
            TokenKind::PaamayimNekudotayim => return Some(NameRole::Class),
            TokenKind::NsSeparator => return Some(NameRole::Namespace),
            TokenKind::Variable => return Some(NameRole::Class),
            TokenKind::Whitespace => {
                if let Some(second) = second {
                    if matches!(second.kind, TokenKind::Variable | TokenKind::Ellipsis) {
                        return Some(NameRole::Class);
                    }
                    if second.is_punct('{') {
                        self.maybe_class_return = true;
                    }
                }
            }
            _ => {}
        }

        if first.is_punct('(') {
            self.maybe_function = true;
        }
        None
    }

    /// Scan earlier tokens, newest first, skipping whitespace.
    pub fn look_behind<'a>(
        &self,
        previous: impl IntoIterator<Item = &'a RawToken>,
        next: [Option<&RawToken>; 2],
    ) -> Option<NameRole> {
        for token in previous {
            if token.kind == TokenKind::Punct {
                if self.maybe_function {
                    return Some(NameRole::Function);
                }
                if token.is_punct(';') {
                    return None;
                }
                if token.is_punct(':') && next.iter().flatten().any(|t| t.is_punct('{')) {
                    return Some(NameRole::ClassReturn);
                }
                continue;
            }

            if token.kind.is_whitespace() {
                continue;
            }

            if self.maybe_function {
                // Walk back over the rest of a qualified name.
                match token.kind {
                    TokenKind::NsSeparator | TokenKind::Name => continue,
                    TokenKind::New => return Some(NameRole::Class),
                    _ => return Some(NameRole::Function),
                }
            }

            return match token.kind {
                TokenKind::Const | TokenKind::PaamayimNekudotayim => Some(NameRole::Constant),
                kind if kind.is_member_access() => Some(NameRole::Member),
                TokenKind::Extends
                | TokenKind::Implements
                | TokenKind::Class
                | TokenKind::Use
                | TokenKind::NsSeparator => Some(NameRole::Class),
                _ if self.maybe_class_return => Some(NameRole::ClassReturn),
                _ => None,
            };
        }

        self.maybe_function.then_some(NameRole::Function)
    }
}

/// Fixed class string for a token kind.
pub fn base_label(kind: TokenKind) -> &'static str {
    use TokenKind::*;

    match kind {
        Abstract => "keyword abstract",
        Array => "keyword array",
        As => "keyword as",
        Class => "keyword class",
        Clone => "keyword clone",
        Const => "keyword const",
        Declare => "keyword declare",
        Default => "keyword default",
        Echo => "keyword echo",
        EndDeclare => "keyword enddeclare",
        Enum => "keyword enum",
        Extends => "keyword extends",
        Final => "keyword final",
        Fn => "keyword fn",
        Function => "keyword function",
        Global => "keyword global",
        Implements => "keyword implements",
        Include => "keyword include",
        IncludeOnce => "keyword include-once",
        InstanceOf => "keyword instanceof",
        InsteadOf => "keyword insteadof",
        Interface => "keyword interface",
        Namespace => "keyword namespace",
        New => "keyword new",
        Print => "keyword print",
        Private => "keyword private",
        Protected => "keyword protected",
        Public => "keyword public",
        Readonly => "keyword readonly",
        Require => "keyword require",
        RequireOnce => "keyword require-once",
        Static => "keyword static",
        Trait => "keyword trait",
        Use => "keyword use",
        Var => "keyword var",

        Break => "keyword flow break",
        Case => "keyword flow case",
        Catch => "keyword flow catch",
        Continue => "keyword flow continue",
        Do => "keyword flow do",
        Else => "keyword flow else",
        ElseIf => "keyword flow elseif",
        EndFor => "keyword flow endfor",
        EndForeach => "keyword flow endforeach",
        EndIf => "keyword flow endif",
        EndSwitch => "keyword flow endswitch",
        EndWhile => "keyword flow endwhile",
        Exit => "keyword flow exit",
        Finally => "keyword flow finally",
        For => "keyword flow for",
        Foreach => "keyword flow foreach",
        Goto => "keyword flow goto",
        If => "keyword flow if",
        Match => "keyword flow match",
        Return => "keyword flow return",
        Switch => "keyword flow switch",
        Throw => "keyword flow throw",
        Try => "keyword flow try",
        While => "keyword flow while",
        Yield => "keyword flow yield",
        YieldFrom => "keyword flow yield-from",

        Callable => "type callable",

        ArrayCast => "cast array-cast",
        BoolCast => "cast bool-cast",
        DoubleCast => "cast double-cast",
        IntCast => "cast int-cast",
        ObjectCast => "cast object-cast",
        StringCast => "cast string-cast",
        UnsetCast => "cast unset-cast",

        CloseTag => "tag close-tag",
        OpenTag => "tag open-tag",
        OpenTagWithEcho => "tag open-tag-with-echo",

        AndEqual => "op and-equal",
        BooleanAnd => "op boolean-and",
        BooleanOr => "op boolean-or",
        Coalesce => "op coalesce",
        CoalesceEqual => "op coalesce-equal",
        ConcatEqual => "op concat-equal",
        Dec => "op dec",
        DivEqual => "op div-equal",
        Ellipsis => "op ellipsis",
        Inc => "op inc",
        IsEqual => "op is-equal",
        IsGreaterOrEqual => "op is-greater-or-equal",
        IsIdentical => "op is-identical",
        IsNotEqual => "op is-not-equal",
        IsNotIdentical => "op is-not-identical",
        IsSmallerOrEqual => "op is-smaller-or-equal",
        LogicalAnd => "op logical-and",
        LogicalOr => "op logical-or",
        LogicalXor => "op logical-xor",
        MinusEqual => "op minus-equal",
        ModEqual => "op mod-equal",
        MulEqual => "op mul-equal",
        OrEqual => "op or-equal",
        PaamayimNekudotayim => "op paamayim-nekudotayim",
        PlusEqual => "op plus-equal",
        Pow => "op pow",
        PowEqual => "op pow-equal",
        Sl => "op sl",
        SlEqual => "op sl-equal",
        Spaceship => "op spaceship",
        Sr => "op sr",
        SrEqual => "op sr-equal",
        XorEqual => "op xor-equal",

        BadCharacter => "char bad-character",

        ClassC => "constant class-c",
        Dir => "constant dir",
        File => "constant file",
        FuncC => "constant func-c",
        Line => "constant line",
        MethodC => "constant method-c",
        NsC => "constant ns-c",
        TraitC => "constant trait-c",

        Empty => "func empty",
        Eval => "func eval",
        HaltCompiler => "func halt-compiler",
        Isset => "func isset",
        List => "func list",
        Unset => "func unset",

        NumString => "var num-string",
        StringVarname => "var string-varname",
        Variable => "var variable",

        ConstantEncapsedString => "string constant-encapsed-string",
        EncapsedAndWhitespace => "string encapsed-and-whitespace",

        DNumber => "float",
        LNumber => "int",

        Attribute => "g attribute",
        CurlyOpen => "g curly-open",
        DollarOpenCurlyBraces => "g dollar-open-curly-braces",
        DoubleArrow => "g double-arrow",
        EndHeredoc => "g end-heredoc",
        NsSeparator => "g ns-separator",
        ObjectOperator => "g object-operator",
        NullsafeObjectOperator => "g nullsafe-object-operator",
        StartHeredoc => "g start-heredoc",
        Whitespace => "g whitespace",

        Comment => "comment",
        DocComment => "comment doc-comment",
        InlineHtml => "html",
        Name => "name",
        Punct => "g",
    }
}
