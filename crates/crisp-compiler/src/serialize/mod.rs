//! IR textual S-expression format (spec §4.9): write the optimizer's output
//! to the wire format described in spec §6, and read it back.

mod reader;
mod writer;

pub use reader::{deserialize_program, deserialize_tree};
pub use writer::{serialize_program, serialize_tree};

#[cfg(test)]
mod round_trip_tests {
    use super::*;
    use crate::ir::{Ir, IrKind};
    use crate::lower::{IrProgram, IrTree};
    use crisp_core::{Span, TypeRef};
    use crisp_syntax::ast_lower::Literal;

    fn action(name: &str) -> Ir {
        Ir {
            id: None,
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Action { declaring_type: "this".to_string(), name: name.to_string(), args: vec![] },
        }
    }

    #[test]
    fn a_single_action_tree_round_trips_through_text() {
        let tree = IrTree { name: "Patrol".to_string(), blackboard_type: None, body: action("Patrol") };
        let text = serialize_tree(&tree);
        let back = deserialize_tree(&text).expect("deserializes");
        assert_eq!(back.name, tree.name);
        assert!(matches!(back.body.kind, IrKind::Action { ref name, .. } if name == "Patrol"));
        assert_eq!(serialize_tree(&back), text);
    }

    #[test]
    fn a_literal_int_round_trips_with_its_value_intact() {
        let lit = Ir { id: None, ty: TypeRef::Int, span: Span::empty(0), kind: IrKind::Literal(Literal::Int(30)) };
        let tree = IrTree { name: "Counter".to_string(), blackboard_type: Some("Blackboard".to_string()), body: lit };
        let text = serialize_tree(&tree);
        let back = deserialize_tree(&text).expect("deserializes");
        assert_eq!(back.blackboard_type.as_deref(), Some("Blackboard"));
        assert!(matches!(back.body.kind, IrKind::Literal(Literal::Int(30))));
    }

    #[test]
    fn node_ids_survive_a_round_trip() {
        let body = Ir {
            id: Some(7),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Selector(vec![
                Ir { id: Some(0), ..action("Flee") },
                Ir { id: Some(1), ..action("Patrol") },
            ]),
        };
        let tree = IrTree { name: "Guard".to_string(), blackboard_type: None, body };
        let back = deserialize_tree(&serialize_tree(&tree)).expect("deserializes");
        assert_eq!(back.body.id, Some(7));
        let IrKind::Selector(children) = &back.body.kind else { panic!() };
        assert_eq!(children[0].id, Some(0));
        assert_eq!(children[1].id, Some(1));
    }

    #[test]
    fn a_convert_nodes_target_type_round_trips_without_a_separate_wire_field() {
        let inner = Ir { id: Some(0), ty: TypeRef::Int, span: Span::empty(0), kind: IrKind::Literal(Literal::Int(3)) };
        let convert =
            Ir { id: Some(1), ty: TypeRef::Float, span: Span::empty(0), kind: IrKind::Convert(Box::new(inner), TypeRef::Float) };
        let tree = IrTree { name: "Cast".to_string(), blackboard_type: None, body: convert };
        let back = deserialize_tree(&serialize_tree(&tree)).expect("deserializes");
        assert_eq!(back.body.ty, TypeRef::Float);
        let IrKind::Convert(_, to) = &back.body.kind else { panic!() };
        assert_eq!(*to, TypeRef::Float);
    }

    #[test]
    fn an_enum_typed_node_round_trips_as_enum_not_a_named_host_type() {
        let lit = Ir {
            id: None,
            ty: TypeRef::Enum("TargetKind".to_string()),
            span: Span::empty(0),
            kind: IrKind::Literal(Literal::Enum("TargetKind".to_string(), "Player".to_string())),
        };
        let tree = IrTree { name: "Target".to_string(), blackboard_type: None, body: lit };
        let back = deserialize_tree(&serialize_tree(&tree)).expect("deserializes");
        assert_eq!(back.body.ty, TypeRef::Enum("TargetKind".to_string()));
    }

    #[test]
    fn a_program_of_several_trees_round_trips() {
        let program = IrProgram {
            trees: vec![
                IrTree { name: "A".to_string(), blackboard_type: None, body: action("Shoot") },
                IrTree { name: "B".to_string(), blackboard_type: None, body: action("Reload") },
            ],
        };
        let text = serialize_program(&program);
        let back = deserialize_program(&text).expect("deserializes");
        assert_eq!(back.trees.len(), 2);
        assert_eq!(back.trees[0].name, "A");
        assert_eq!(back.trees[1].name, "B");
    }
}
