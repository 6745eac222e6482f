//! Recursive-descent parser core (spec §4.2): token sequence → lossless CST.
//!
//! The parser never aborts. A mismatch emits a diagnostic, records a
//! `Missing` or `Error` CST node, and resynchronizes at the nearest
//! recovery point. Every token the lexer produced — including trivia — is
//! pushed into the tree in order, which is what makes the CST lossless:
//! concatenating every leaf token's text reproduces the source exactly.

use crate::lexer::{lex, Token};
use crate::parser::token_set::TokenSet;
use crate::syntax_kind::{CrispLang, SyntaxKind, SyntaxNode};
use crisp_core::diagnostics::DiagnosticCode;
use crisp_core::{Diagnostics, FuelLimits, FuelTracker, Span};
use rowan::{Checkpoint, GreenNodeBuilder};

use SyntaxKind::*;

/// Result of a full parse: the CST root plus any diagnostics gathered.
#[derive(Debug)]
pub struct ParseResult {
    pub root: SyntaxNode,
    pub diagnostics: Diagnostics,
    pub exec_fuel_consumed: u32,
}

pub fn parse(source: &str) -> ParseResult {
    parse_with_limits(source, FuelLimits::default())
}

pub fn parse_with_limits(source: &str, limits: FuelLimits) -> ParseResult {
    let tokens = lex(source);
    let mut parser = Parser::new(source, tokens, limits);
    crate::parser::grammar::program(&mut parser);
    parser.finish()
}

pub(crate) struct Parser<'src> {
    pub(crate) source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    diagnostics: Diagnostics,
    fuel: FuelTracker,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>, limits: FuelLimits) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            fuel: FuelTracker::new(limits),
        }
    }

    fn finish(self) -> ParseResult {
        let green = self.builder.finish();
        ParseResult {
            root: SyntaxNode::new_root(green),
            diagnostics: self.diagnostics,
            exec_fuel_consumed: self.fuel.consumed(),
        }
    }

    // --- token stream navigation ---------------------------------------

    fn raw_nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(Eof)
    }

    /// Current significant (non-trivia) token kind, skipping trivia.
    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        let mut seen = 0;
        let mut i = 0;
        loop {
            let kind = self.raw_nth(i);
            if kind == Eof {
                return Eof;
            }
            if !kind.is_trivia() {
                if seen == n {
                    return kind;
                }
                seen += 1;
            }
            i += 1;
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Text of the nth significant (non-trivia) token ahead, if any.
    pub(crate) fn nth_text(&self, n: usize) -> Option<&str> {
        let mut seen = 0;
        let mut i = 0;
        loop {
            let kind = self.raw_nth(i);
            if kind == Eof {
                return None;
            }
            if !kind.is_trivia() {
                if seen == n {
                    return self.tokens.get(self.pos + i).map(|t| t.text(self.source));
                }
                seen += 1;
            }
            i += 1;
        }
    }

    pub(crate) fn at_set(&self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    fn nth_raw_token(&self, n: usize) -> Option<Token> {
        let mut seen = 0;
        let mut i = 0;
        loop {
            let kind = self.raw_nth(i);
            if kind == Eof {
                return None;
            }
            if !kind.is_trivia() {
                if seen == n {
                    return self.tokens.get(self.pos + i).copied();
                }
                seen += 1;
            }
            i += 1;
        }
    }

    /// True when the next three significant tokens spell `<body>` with no
    /// gaps, the macro body-placeholder spelling (spec §4.4).
    pub(crate) fn at_body_placeholder(&self) -> bool {
        let (Some(lt), Some(body), Some(gt)) =
            (self.nth_raw_token(0), self.nth_raw_token(1), self.nth_raw_token(2))
        else {
            return false;
        };
        lt.kind == Lt
            && body.kind == Ident
            && body.text(self.source) == "body"
            && gt.kind == Gt
            && lt.end == body.start
            && body.end == gt.start
    }

    /// Consumes the three tokens of a `<body>` placeholder as one unit.
    pub(crate) fn bump_body_placeholder(&mut self) {
        self.start_node(BodyPlaceholder);
        self.bump();
        self.bump();
        self.bump();
        self.finish_node();
    }

    pub(crate) fn eof(&self) -> bool {
        self.current() == Eof
    }

    pub(crate) fn current_span(&self) -> Span {
        let mut i = self.pos;
        while self.raw_nth(i - self.pos) != Eof && self.raw_nth(i - self.pos).is_trivia() {
            i += 1;
        }
        match self.tokens.get(i) {
            Some(t) => Span::new(t.start, t.end),
            None => {
                let end = self.source.len() as u32;
                Span::new(end, end)
            }
        }
    }

    pub(crate) fn last_span(&self) -> Span {
        if self.pos == 0 {
            return Span::new(0, 0);
        }
        let t = self.tokens[self.pos - 1];
        Span::new(t.start, t.end)
    }

    // --- tree building ---------------------------------------------------

    fn push_raw_token(&mut self, n: usize) {
        let tok = self.tokens[self.pos + n];
        let text = tok.text(self.source);
        self.builder.token(tok.kind.into(), text);
    }

    /// Flushes any leading trivia and then the current significant token.
    pub(crate) fn bump(&mut self) {
        loop {
            let kind = self.raw_nth(0);
            if kind == Eof {
                return;
            }
            self.push_raw_token(0);
            self.pos += 1;
            if !kind.is_trivia() {
                return;
            }
        }
    }

    /// Flushes leading trivia only, without consuming a significant token.
    fn flush_trivia(&mut self) {
        while self.raw_nth(0).is_trivia() {
            self.push_raw_token(0);
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_msg(format!("expected {:?}, found {:?}", kind, self.current()));
        false
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(crate) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // --- diagnostics ------------------------------------------------------

    pub(crate) fn error_msg(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.diagnostics
            .report(DiagnosticCode::SYNTAX_ERROR, span)
            .message(message.into())
            .emit();
    }

    pub(crate) fn error_code(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        let span = self.current_span();
        self.diagnostics.report(code, span).message(message.into()).emit();
    }

    /// Wraps the current token in an `Error` node and consumes it, then
    /// returns to the caller for resynchronization.
    pub(crate) fn error_and_bump(&mut self, message: impl Into<String>) {
        self.error_msg(message);
        self.start_node(Error);
        if !self.eof() {
            self.bump();
        }
        self.finish_node();
    }

    /// Emits a `Missing` node without consuming any input; used when an
    /// optional/required piece is absent but the stream should not advance.
    pub(crate) fn missing(&mut self) {
        self.start_node(Missing);
        self.finish_node();
    }

    /// Skips tokens until one of `recovery` is found (or EOF), recording a
    /// diagnostic for the skipped span.
    pub(crate) fn error_recover(&mut self, message: impl Into<String>, recovery: TokenSet) {
        self.error_msg(message);
        self.start_node(Error);
        while !self.eof() && !self.at_set(recovery) {
            self.bump();
        }
        self.finish_node();
    }

    /// Skips an unrecognized top-level or body form by paren-counting until
    /// the matching right paren, per spec §4.2's top-level recovery rule.
    pub(crate) fn skip_balanced_form(&mut self) {
        let mut depth: i32 = 0;
        loop {
            match self.current() {
                Eof => return,
                LParen => {
                    depth += 1;
                    self.bump();
                }
                RParen => {
                    self.bump();
                    depth -= 1;
                    if depth <= 0 {
                        return;
                    }
                }
                _ => self.bump(),
            }
        }
    }

    // --- recursion / fuel --------------------------------------------------

    pub(crate) fn enter_recursion(&mut self) -> bool {
        self.fuel.enter().is_ok()
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.fuel.exit();
    }

    pub(crate) fn spend_fuel(&mut self) -> bool {
        self.fuel.spend().is_ok()
    }
}

pub type CrispSyntaxNode = rowan::SyntaxNode<CrispLang>;

#[cfg(test)]
mod core_tests {
    use super::*;

    #[test]
    fn every_token_round_trips_through_the_cst() {
        let source = "(tree Main (select (.Flee) (.Patrol)))";
        let result = parse(source);
        assert_eq!(result.root.text().to_string(), source);
    }

    #[test]
    fn trivia_including_comments_round_trips() {
        let source = ";; leading\n(tree Main\n  (select (.Flee)))\n";
        let result = parse(source);
        assert_eq!(result.root.text().to_string(), source);
    }

    #[test]
    fn unknown_top_level_form_is_skipped_with_a_diagnostic() {
        let source = "(bogus 1 2) (tree Main (select (.Flee)))";
        let result = parse(source);
        assert!(!result.diagnostics.is_empty());
        assert_eq!(result.root.text().to_string(), source);
    }
}
