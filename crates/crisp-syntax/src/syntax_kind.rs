//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node
//! kinds (from the parser). Logos derives token recognition; node kinds lack
//! token/regex attributes so Logos ignores them. `CrispLang` implements
//! Rowan's `Language` trait so the lossless CST (spec §3/§4.2) can be built
//! directly on top of `rowan::GreenNode`.

use logos::Logos;
use rowan::Language;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    LParen = 0,
    #[token(")")]
    RParen,

    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*")]
    Ident,

    /// `true`/`false`/`null` are reclassified from `Ident` by the lexer's
    /// post-pass (spec §4.1), not matched directly here, so that ordinary
    /// identifiers containing those substrings are unaffected.
    KwTrue,
    KwFalse,
    KwNull,

    #[regex(r"-?[0-9]+")]
    IntLit,
    #[regex(r"-?[0-9]+\.[0-9]+")]
    FloatLit,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StrLit,

    #[regex(r"\.[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)*")]
    MemberTok,
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)*")]
    BlackboardTok,
    #[regex(r"::[A-Za-z_][A-Za-z0-9_-]*\.[A-Za-z_][A-Za-z0-9_-]*")]
    EnumLit,
    #[regex(r":[A-Za-z_][A-Za-z0-9_-]*")]
    KeywordTok,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("!=")]
    Ne,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,

    #[regex(r"[ \t]+")]
    Whitespace,
    #[regex(r"\n|\r\n")]
    Newline,
    #[regex(r";;[^\n]*")]
    Comment,

    /// Unrecognized single scalar value; the lexer never fails outright.
    ErrorTok,
    Eof,

    // --- Node kinds (non-terminals); Logos ignores these (no attributes) ---
    Program,
    Tree,
    Select,
    Sequence,
    Parallel,
    Check,
    Guard,
    If,
    Invert,
    Repeat,
    Timeout,
    Cooldown,
    While,
    Reactive,
    ReactiveSelect,
    Ref,
    Defdec,
    Defmacro,
    DefdecCall,
    Import,
    BodyPlaceholder,
    Call,
    ParamList,
    ArgList,
    MemberAccess,
    BlackboardAccess,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,
    NullLiteral,
    EnumLiteral,
    BinaryExpr,
    UnaryExpr,
    LogicExpr,
    /// A bare identifier in expression position inside a `defdec`/`defmacro`
    /// body — a macro/decorator parameter reference, substituted away
    /// during expansion (spec §4.4/§4.5/§9).
    ParamRef,
    Missing,
    Error,

    /// Sentinel; must stay last for `kind_from_raw` bounds checking.
    #[doc(hidden)]
    __Last,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | Comment)
    }

    #[inline]
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Plus | Minus | Star | Slash | Percent | Lt | Gt | Le | Ge | Eq | Ne
        )
    }

    #[inline]
    pub fn is_literal_token(self) -> bool {
        matches!(
            self,
            IntLit | FloatLit | StrLit | KwTrue | KwFalse | KwNull | EnumLit
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrispLang {}

impl Language for CrispLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __Last as u16);
        // SAFETY: bounds-checked above; SyntaxKind is repr(u16).
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<CrispLang>;
pub type SyntaxToken = rowan::SyntaxToken<CrispLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

#[cfg(test)]
mod syntax_kind_tests {
    use super::*;

    #[test]
    fn operator_classification_matches_the_comparison_and_arithmetic_set() {
        assert!(Lt.is_operator());
        assert!(Percent.is_operator());
        assert!(!Ident.is_operator());
    }

    #[test]
    fn trivia_kinds_are_whitespace_newline_and_comment_only() {
        assert!(Whitespace.is_trivia());
        assert!(Comment.is_trivia());
        assert!(!Ident.is_trivia());
    }
}
