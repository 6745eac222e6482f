//! `TokenSet`: a `u64` bitset over `SyntaxKind` for O(1) FIRST/recovery-set
//! membership tests. `SyntaxKind` has well under 64 variants so a single
//! word suffices.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> TokenSet {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << (kinds[i] as u16);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn single(kind: SyntaxKind) -> TokenSet {
        TokenSet(1 << (kind as u16))
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub const fn contains(self, kind: SyntaxKind) -> bool {
        self.0 & (1 << (kind as u16)) != 0
    }
}

pub mod token_sets {
    use super::TokenSet;
    use crate::syntax_kind::SyntaxKind::*;

    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace, Newline, Comment]);

    pub const NODE_KEYWORDS: TokenSet = TokenSet::new(&[Ident]);

    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        LParen, IntLit, FloatLit, StrLit, KwTrue, KwFalse, KwNull, MemberTok, BlackboardTok,
        EnumLit,
    ]);

    pub const TOP_LEVEL_RECOVERY: TokenSet = TokenSet::new(&[LParen, Eof]);

    pub const BODY_RECOVERY: TokenSet = TokenSet::new(&[RParen, LParen, Eof]);
}

#[cfg(test)]
mod token_set_tests {
    use super::*;
    use crate::syntax_kind::SyntaxKind::*;

    #[test]
    fn contains_reflects_membership_exactly() {
        let set = TokenSet::new(&[LParen, RParen]);
        assert!(set.contains(LParen));
        assert!(set.contains(RParen));
        assert!(!set.contains(Ident));
    }

    #[test]
    fn union_combines_both_operands() {
        let a = TokenSet::single(Plus);
        let b = TokenSet::single(Minus);
        let u = a.union(b);
        assert!(u.contains(Plus));
        assert!(u.contains(Minus));
        assert!(!u.contains(Star));
    }
}
