//! Raw lexical tokens and the lexer seam.
//!
//! The engine never tokenizes source itself. A [`Lexer`] implementation turns source text into
//! an ordered list of [`RawToken`]s; everything downstream (windowing, classification,
//! rendering) only consumes that list.

use serde::Serialize;

/// A single token produced by a [`Lexer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawToken {
    /// Grammar-defined lexical category.
    pub kind: TokenKind,
    /// Literal source text of the token.
    pub text: String,
    /// 1-based line on which the token starts.
    pub line: usize,
}

impl RawToken {
    /// Create a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    /// Build the piece left over after splitting this token at a newline.
    ///
    /// The remainder keeps the kind and starts on the following line.
    pub fn remainder(&self, text: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            text: text.into(),
            line: self.line + 1,
        }
    }

    /// Returns `true` if this is single-character punctuation equal to `ch`.
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct && self.text.chars().eq(std::iter::once(ch))
    }
}

/// Turns source text into raw tokens.
///
/// Implementations must emit tokens in source order, and every token's `line` must be the
/// 1-based line on which it starts. Only kinds reported by [`TokenKind::is_splittable`] may
/// contain embedded newlines.
pub trait Lexer {
    /// The error type returned by [`Lexer::tokenize`].
    type Error;

    /// Tokenize a complete source text.
    fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, Self::Error>;
}

impl<L: Lexer + ?Sized> Lexer for &L {
    type Error = L::Error;

    fn tokenize(&self, source: &str) -> Result<Vec<RawToken>, Self::Error> {
        (**self).tokenize(source)
    }
}

macro_rules! token_kinds {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)*) => {
        /// Lexical category of a [`RawToken`].
        ///
        /// The set is closed: every kind the bundled lexer can produce is listed here, and the
        /// classifier's label table matches on all of them.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum TokenKind {
            $($(#[$meta])* $variant,)*
        }

        impl TokenKind {
            /// All kinds, in declaration order.
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Stable hyphenated name of the kind (e.g. `"object-operator"`).
            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $name,)*
                }
            }
        }
    };
}

token_kinds! {
    // Declaration and structural keywords.
    Abstract => "abstract",
    Array => "array",
    As => "as",
    Class => "class",
    Clone => "clone",
    Const => "const",
    Declare => "declare",
    Default => "default",
    Echo => "echo",
    EndDeclare => "enddeclare",
    Enum => "enum",
    Extends => "extends",
    Final => "final",
    Fn => "fn",
    Function => "function",
    Global => "global",
    Implements => "implements",
    Include => "include",
    IncludeOnce => "include-once",
    InstanceOf => "instanceof",
    InsteadOf => "insteadof",
    Interface => "interface",
    Namespace => "namespace",
    New => "new",
    Print => "print",
    Private => "private",
    Protected => "protected",
    Public => "public",
    Readonly => "readonly",
    Require => "require",
    RequireOnce => "require-once",
    Static => "static",
    Trait => "trait",
    Use => "use",
    Var => "var",

    // Flow control keywords.
    Break => "break",
    Case => "case",
    Catch => "catch",
    Continue => "continue",
    Do => "do",
    Else => "else",
    ElseIf => "elseif",
    EndFor => "endfor",
    EndForeach => "endforeach",
    EndIf => "endif",
    EndSwitch => "endswitch",
    EndWhile => "endwhile",
    Exit => "exit",
    Finally => "finally",
    For => "for",
    Foreach => "foreach",
    Goto => "goto",
    If => "if",
    Match => "match",
    Return => "return",
    Switch => "switch",
    Throw => "throw",
    Try => "try",
    While => "while",
    Yield => "yield",
    YieldFrom => "yield-from",

    Callable => "callable",

    // Casts.
    ArrayCast => "array-cast",
    BoolCast => "bool-cast",
    DoubleCast => "double-cast",
    IntCast => "int-cast",
    ObjectCast => "object-cast",
    StringCast => "string-cast",
    UnsetCast => "unset-cast",

    // Tags.
    CloseTag => "close-tag",
    OpenTag => "open-tag",
    OpenTagWithEcho => "open-tag-with-echo",

    // Multi-character operators.
    AndEqual => "and-equal",
    BooleanAnd => "boolean-and",
    BooleanOr => "boolean-or",
    Coalesce => "coalesce",
    CoalesceEqual => "coalesce-equal",
    ConcatEqual => "concat-equal",
    Dec => "dec",
    DivEqual => "div-equal",
    Ellipsis => "ellipsis",
    Inc => "inc",
    IsEqual => "is-equal",
    IsGreaterOrEqual => "is-greater-or-equal",
    IsIdentical => "is-identical",
    IsNotEqual => "is-not-equal",
    IsNotIdentical => "is-not-identical",
    IsSmallerOrEqual => "is-smaller-or-equal",
    LogicalAnd => "logical-and",
    LogicalOr => "logical-or",
    LogicalXor => "logical-xor",
    MinusEqual => "minus-equal",
    ModEqual => "mod-equal",
    MulEqual => "mul-equal",
    OrEqual => "or-equal",
    /// Scope-resolution operator (`::`).
    PaamayimNekudotayim => "paamayim-nekudotayim",
    PlusEqual => "plus-equal",
    Pow => "pow",
    PowEqual => "pow-equal",
    Sl => "sl",
    SlEqual => "sl-equal",
    Spaceship => "spaceship",
    Sr => "sr",
    SrEqual => "sr-equal",
    XorEqual => "xor-equal",

    /// A byte the lexer could not place in any other category.
    BadCharacter => "bad-character",

    // Magic constants.
    ClassC => "class-c",
    Dir => "dir",
    File => "file",
    FuncC => "func-c",
    Line => "line",
    MethodC => "method-c",
    NsC => "ns-c",
    TraitC => "trait-c",

    // Language constructs that read like functions.
    Empty => "empty",
    Eval => "eval",
    HaltCompiler => "halt-compiler",
    Isset => "isset",
    List => "list",
    Unset => "unset",

    // Variables.
    NumString => "num-string",
    StringVarname => "string-varname",
    Variable => "variable",

    // Strings.
    ConstantEncapsedString => "constant-encapsed-string",
    EncapsedAndWhitespace => "encapsed-and-whitespace",

    // Numbers.
    DNumber => "dnumber",
    LNumber => "lnumber",

    // Grammar tokens.
    /// Attribute opener (`#[`).
    Attribute => "attribute",
    CurlyOpen => "curly-open",
    DollarOpenCurlyBraces => "dollar-open-curly-braces",
    DoubleArrow => "double-arrow",
    EndHeredoc => "end-heredoc",
    /// Namespace separator (`\`).
    NsSeparator => "ns-separator",
    /// Member-access operator (`->`).
    ObjectOperator => "object-operator",
    NullsafeObjectOperator => "nullsafe-object-operator",
    StartHeredoc => "start-heredoc",
    Whitespace => "whitespace",

    Comment => "comment",
    DocComment => "doc-comment",
    InlineHtml => "inline-html",
    /// Bare identifier.
    Name => "string",
    /// Single-character punctuation; the character is the token text.
    Punct => "punct",
}

impl TokenKind {
    /// Returns `true` for whitespace tokens.
    pub fn is_whitespace(self) -> bool {
        self == TokenKind::Whitespace
    }

    /// Kinds whose text may carry embedded newlines, and which the windower therefore splits
    /// at window edges.
    pub fn is_splittable(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Comment
                | TokenKind::DocComment
                | TokenKind::InlineHtml
                | TokenKind::EncapsedAndWhitespace
                | TokenKind::OpenTag
                | TokenKind::CloseTag
                | TokenKind::StartHeredoc
        )
    }

    /// Instance member access (`->` and `?->`).
    pub fn is_member_access(self) -> bool {
        matches!(
            self,
            TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator
        )
    }
}
