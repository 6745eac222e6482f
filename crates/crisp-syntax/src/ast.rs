//! Typed accessors over the CST (spec §3's CST variant list), analogous to
//! a typed AST-over-rowan layer: each wrapper is a thin, cheaply-cloned
//! view onto a `SyntaxNode`, not an owned tree.

use crate::syntax_kind::{SyntaxKind::*, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == $kind {
                    Some(Self(node))
                } else {
                    None
                }
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Program, crate::syntax_kind::SyntaxKind::Program);
ast_node!(Tree, crate::syntax_kind::SyntaxKind::Tree);
ast_node!(Defdec, crate::syntax_kind::SyntaxKind::Defdec);
ast_node!(Defmacro, crate::syntax_kind::SyntaxKind::Defmacro);
ast_node!(Import, crate::syntax_kind::SyntaxKind::Import);
ast_node!(Select, crate::syntax_kind::SyntaxKind::Select);
ast_node!(Sequence, crate::syntax_kind::SyntaxKind::Sequence);
ast_node!(Parallel, crate::syntax_kind::SyntaxKind::Parallel);
ast_node!(Check, crate::syntax_kind::SyntaxKind::Check);
ast_node!(Guard, crate::syntax_kind::SyntaxKind::Guard);
ast_node!(If, crate::syntax_kind::SyntaxKind::If);
ast_node!(Invert, crate::syntax_kind::SyntaxKind::Invert);
ast_node!(Repeat, crate::syntax_kind::SyntaxKind::Repeat);
ast_node!(Timeout, crate::syntax_kind::SyntaxKind::Timeout);
ast_node!(Cooldown, crate::syntax_kind::SyntaxKind::Cooldown);
ast_node!(While, crate::syntax_kind::SyntaxKind::While);
ast_node!(Reactive, crate::syntax_kind::SyntaxKind::Reactive);
ast_node!(ReactiveSelect, crate::syntax_kind::SyntaxKind::ReactiveSelect);
ast_node!(Ref, crate::syntax_kind::SyntaxKind::Ref);
ast_node!(DefdecCall, crate::syntax_kind::SyntaxKind::DefdecCall);
ast_node!(BodyPlaceholder, crate::syntax_kind::SyntaxKind::BodyPlaceholder);
ast_node!(Call, crate::syntax_kind::SyntaxKind::Call);
ast_node!(ParamList, crate::syntax_kind::SyntaxKind::ParamList);
ast_node!(MemberAccess, crate::syntax_kind::SyntaxKind::MemberAccess);
ast_node!(BlackboardAccess, crate::syntax_kind::SyntaxKind::BlackboardAccess);
ast_node!(IntLiteral, crate::syntax_kind::SyntaxKind::IntLiteral);
ast_node!(FloatLiteral, crate::syntax_kind::SyntaxKind::FloatLiteral);
ast_node!(StringLiteral, crate::syntax_kind::SyntaxKind::StringLiteral);
ast_node!(BoolLiteral, crate::syntax_kind::SyntaxKind::BoolLiteral);
ast_node!(NullLiteral, crate::syntax_kind::SyntaxKind::NullLiteral);
ast_node!(EnumLiteral, crate::syntax_kind::SyntaxKind::EnumLiteral);
ast_node!(BinaryExpr, crate::syntax_kind::SyntaxKind::BinaryExpr);
ast_node!(UnaryExpr, crate::syntax_kind::SyntaxKind::UnaryExpr);
ast_node!(LogicExpr, crate::syntax_kind::SyntaxKind::LogicExpr);
ast_node!(ParamRef, crate::syntax_kind::SyntaxKind::ParamRef);
ast_node!(Missing, crate::syntax_kind::SyntaxKind::Missing);
ast_node!(ErrorNode, crate::syntax_kind::SyntaxKind::Error);

impl Program {
    pub fn trees(&self) -> impl Iterator<Item = Tree> + '_ {
        self.0.children().filter_map(Tree::cast)
    }

    pub fn defdecs(&self) -> impl Iterator<Item = Defdec> + '_ {
        self.0.children().filter_map(Defdec::cast)
    }

    pub fn defmacros(&self) -> impl Iterator<Item = Defmacro> + '_ {
        self.0.children().filter_map(Defmacro::cast)
    }

    pub fn imports(&self) -> impl Iterator<Item = Import> + '_ {
        self.0.children().filter_map(Import::cast)
    }
}

impl Tree {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == Ident)
    }

    pub fn blackboard_type_token(&self) -> Option<SyntaxToken> {
        let mut tokens = self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == Ident);
        tokens.next(); // name
        tokens.next()
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }
}

impl Defdec {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == Ident)
    }

    pub fn params(&self) -> Option<ParamList> {
        self.0.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() != crate::syntax_kind::SyntaxKind::ParamList)
    }
}

impl Defmacro {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == Ident)
    }

    pub fn params(&self) -> Option<ParamList> {
        self.0.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() != crate::syntax_kind::SyntaxKind::ParamList)
    }
}

impl ParamList {
    pub fn param_tokens(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == Ident)
    }
}

impl Import {
    pub fn path_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == StrLit)
    }
}

impl Ref {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == Ident)
    }
}

impl DefdecCall {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == Ident)
    }

    pub fn args(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }
}

impl Call {
    pub fn member_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == MemberTok)
    }

    pub fn args(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }
}

impl MemberAccess {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == MemberTok)
    }
}

impl BlackboardAccess {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == BlackboardTok)
    }
}

macro_rules! literal_token_accessor {
    ($name:ident, $kind:expr) => {
        impl $name {
            pub fn token(&self) -> Option<SyntaxToken> {
                self.0
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .find(|t| t.kind() == $kind)
            }
        }
    };
}

literal_token_accessor!(IntLiteral, IntLit);
literal_token_accessor!(FloatLiteral, FloatLit);
literal_token_accessor!(StringLiteral, StrLit);
literal_token_accessor!(EnumLiteral, EnumLit);
literal_token_accessor!(ParamRef, Ident);

impl BoolLiteral {
    pub fn is_true(&self) -> bool {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == KwTrue)
    }
}

macro_rules! binary_like_accessors {
    ($name:ident) => {
        impl $name {
            pub fn operator_token(&self) -> Option<SyntaxToken> {
                self.0
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .find(|t| t.kind().is_operator())
            }

            pub fn operands(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
                self.0.children()
            }
        }
    };
}

binary_like_accessors!(BinaryExpr);
binary_like_accessors!(UnaryExpr);

impl LogicExpr {
    pub fn keyword_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == Ident)
    }

    pub fn operands(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }
}

macro_rules! single_body_accessors {
    ($name:ident) => {
        impl $name {
            pub fn body(&self) -> Option<SyntaxNode> {
                self.0.children().next()
            }
        }
    };
}

single_body_accessors!(Invert);

impl Guard {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }
}

impl Check {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }
}

impl If {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn then_branch(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }

    pub fn else_branch(&self) -> Option<SyntaxNode> {
        self.0.children().nth(2)
    }
}

impl Repeat {
    pub fn count_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == IntLit)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }
}

macro_rules! duration_body_accessors {
    ($name:ident) => {
        impl $name {
            pub fn duration_token(&self) -> Option<SyntaxToken> {
                self.0
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .find(|t| matches!(t.kind(), IntLit | FloatLit))
            }

            pub fn body(&self) -> Option<SyntaxNode> {
                self.0.children().next()
            }
        }
    };
}

duration_body_accessors!(Timeout);
duration_body_accessors!(Cooldown);

impl While {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }
}

impl Reactive {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }
}

impl Parallel {
    pub fn policy_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == KeywordTok)
    }

    pub fn count_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == IntLit)
    }

    pub fn children_nodes(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }
}

macro_rules! composite_children_accessors {
    ($name:ident) => {
        impl $name {
            pub fn children_nodes(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
                self.0.children()
            }
        }
    };
}

composite_children_accessors!(Select);
composite_children_accessors!(Sequence);
composite_children_accessors!(ReactiveSelect);

#[cfg(test)]
mod ast_tests {
    use super::*;
    use crate::parser::core::parse;

    #[test]
    fn program_enumerates_trees_in_source_order() {
        let result = parse("(tree A (select (.X))) (tree B (select (.Y)))");
        let program = Program::cast(result.root).unwrap();
        let names: Vec<_> = program
            .trees()
            .map(|t| t.name_token().unwrap().text().to_string())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn check_condition_is_the_wrapped_binary_expr() {
        let result = parse("(tree T (check (< .Health 30)))");
        let program = Program::cast(result.root).unwrap();
        let tree = program.trees().next().unwrap();
        let body = tree.body().unwrap();
        let check = Check::cast(body).unwrap();
        let cond = check.condition().unwrap();
        assert_eq!(cond.kind(), BinaryExpr);
    }
}
