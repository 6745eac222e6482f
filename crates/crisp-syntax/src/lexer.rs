//! Text → token sequence (spec §4.1). The lexer never fails: unrecognized
//! scalars become `ErrorTok` and recognition continues.

use crate::syntax_kind::SyntaxKind::{self, *};
use logos::Logos;

/// A single lexed token: kind, raw span, and raw text slice bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
}

impl Token {
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start as usize..self.end as usize]
    }
}

/// Lexes `source` into a flat token list, applying the post-passes that
/// Logos's regex grammar cannot express directly: keyword reclassification
/// and the negative-literal-vs-`Minus` disambiguation (spec §4.1).
pub fn lex(source: &str) -> Vec<Token> {
    let mut raw: Vec<Token> = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => ErrorTok,
        };
        raw.push(Token {
            kind,
            start: span.start as u32,
            end: span.end as u32,
        });
    }

    reclassify_keywords(&mut raw, source);
    disambiguate_minus(&mut raw, source);

    raw.push(Token {
        kind: Eof,
        start: source.len() as u32,
        end: source.len() as u32,
    });
    raw
}

fn reclassify_keywords(tokens: &mut [Token], source: &str) {
    for tok in tokens.iter_mut() {
        if tok.kind != Ident {
            continue;
        }
        match tok.text(source) {
            "true" => tok.kind = KwTrue,
            "false" => tok.kind = KwFalse,
            "null" => tok.kind = KwNull,
            _ => {}
        }
    }
}

/// Merges a standalone `Minus` immediately followed (zero gap) by `IntLit`/
/// `FloatLit` into a single negative-literal token, UNLESS the `Minus` is
/// itself immediately preceded (zero gap) by `LParen` — in that position it
/// is the prefix subtraction operator head (spec §4.1 scenario 2: `(- 5 3)`
/// keeps `Minus` separate, while `(> .Health -1)` merges into `-1`).
///
/// Crisp's surface syntax is pure prefix S-expression notation, so the only
/// place a bare `-` can mean "start of an operator call" is that call-head
/// position; everywhere else a `-` glued to digits is read as a sign.
fn disambiguate_minus(tokens: &mut Vec<Token>, source: &str) {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        if tok.kind == Minus {
            let glued_to_next = tokens
                .get(i + 1)
                .is_some_and(|n| n.start == tok.end && matches!(n.kind, IntLit | FloatLit));
            let preceded_by_open_paren_glued = merged
                .last()
                .is_some_and(|p: &Token| p.kind == LParen && p.end == tok.start);
            if glued_to_next && !preceded_by_open_paren_glued {
                let lit = tokens[i + 1];
                merged.push(Token {
                    kind: lit.kind,
                    start: tok.start,
                    end: lit.end,
                });
                i += 2;
                continue;
            }
        }
        merged.push(tok);
        i += 1;
    }
    let _ = source;
    *tokens = merged;
}

#[cfg(test)]
mod lexer_tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn minus_glued_to_paren_stays_an_operator() {
        let ks = kinds("(- 5 3)");
        assert_eq!(
            ks,
            vec![LParen, Minus, Whitespace, IntLit, Whitespace, IntLit, RParen, Eof]
        );
    }

    #[test]
    fn minus_glued_to_digits_elsewhere_becomes_a_negative_literal() {
        let ks = kinds("(> .Health -1)");
        assert_eq!(
            ks,
            vec![
                LParen, Gt, Whitespace, MemberTok, Whitespace, IntLit, RParen, Eof
            ]
        );
        let toks = lex("(> .Health -1)");
        let neg = toks[5];
        assert_eq!(neg.text("(> .Health -1)"), "-1");
    }

    #[test]
    fn true_false_null_identifiers_are_reclassified() {
        assert_eq!(kinds("true"), vec![KwTrue, Eof]);
        assert_eq!(kinds("false"), vec![KwFalse, Eof]);
        assert_eq!(kinds("null"), vec![KwNull, Eof]);
        assert_eq!(kinds("truest"), vec![Ident, Eof]);
    }

    #[test]
    fn line_comment_runs_to_end_of_line() {
        let toks = lex(";; hi\n(tree");
        assert_eq!(toks[0].kind, Comment);
        assert_eq!(toks[1].kind, Newline);
    }

    #[test]
    fn unrecognized_scalar_becomes_an_error_token_not_a_lexer_failure() {
        let ks = kinds("(tree @)");
        assert!(ks.contains(&ErrorTok));
    }

    #[test]
    fn enum_literal_and_keyword_tokens_are_recognized() {
        assert_eq!(kinds("::TargetKind.Player"), vec![EnumLit, Eof]);
        assert_eq!(kinds(":any"), vec![KeywordTok, Eof]);
    }
}
