//! Tree-walking interpreter (spec §4.11): `Tick` over the optimized IR,
//! with a per-node state map for the stateful decorators (`Repeat`,
//! `Timeout`, `Cooldown`, `Reactive`, `ReactiveSelect`) and a fuel/recursion
//! bound shared with the rest of the pipeline (spec §5).

use crate::context::{Blackboard, Context};
use crate::error::RuntimeError;
use crate::state::NodeState;
use crate::value::Value;
use crisp_compiler::ir::{Ir, IrKind};
use crisp_core::status::BtStatus;
use crisp_core::{FuelLimits, FuelTracker, TypeRef};
use crisp_syntax::ast_lower::{BinaryOp, Literal, ParallelPolicy, UnaryOp};
use indexmap::IndexMap;

/// Ticks one tree's IR, tracking state for every stateful node in it by id.
pub struct Interpreter {
    state: IndexMap<u32, NodeState>,
    fuel: FuelTracker,
    limits: FuelLimits,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_limits(FuelLimits::default())
    }

    pub fn with_limits(limits: FuelLimits) -> Self {
        Self {
            state: IndexMap::new(),
            fuel: FuelTracker::new(limits),
            limits,
        }
    }

    /// Clears all per-node state; does not reset the fuel tracker, which is
    /// bounded per top-level `tick` call instead (spec §5).
    pub fn reset(&mut self) {
        self.state.clear();
    }

    pub fn tick(
        &mut self,
        ir: &Ir,
        ctx: &mut dyn Context,
        blackboard: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        self.fuel = FuelTracker::new(self.limits);
        self.tick_node(ir, ctx, blackboard, dt)
    }

    fn tick_node(
        &mut self,
        ir: &Ir,
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        self.fuel.spend().map_err(|_| RuntimeError::ExecFuelExhausted)?;
        self.fuel.enter().map_err(|_| RuntimeError::RecursionLimitExceeded)?;
        let result = self.tick_kind(ir, ctx, bb, dt);
        self.fuel.exit();
        result
    }

    fn tick_kind(
        &mut self,
        ir: &Ir,
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        match &ir.kind {
            IrKind::Selector(children) => {
                for child in children {
                    let status = self.tick_node(child, ctx, bb, dt)?;
                    if status != BtStatus::Failure {
                        return Ok(status);
                    }
                }
                Ok(BtStatus::Failure)
            }
            IrKind::Sequence(children) => {
                for child in children {
                    let status = self.tick_node(child, ctx, bb, dt)?;
                    if status != BtStatus::Success {
                        return Ok(status);
                    }
                }
                Ok(BtStatus::Success)
            }
            IrKind::ReactiveSelect(children) => self.tick_reactive_select(ir.id, children, ctx, bb, dt),
            IrKind::Parallel { policy, children } => self.tick_parallel(*policy, children, ctx, bb, dt),
            IrKind::Guard { cond, body } => {
                if self.truthy_cond(cond, ctx, bb)? {
                    self.tick_node(body, ctx, bb, dt)
                } else {
                    Ok(BtStatus::Failure)
                }
            }
            IrKind::If { cond, then_branch, else_branch } => {
                if self.truthy_cond(cond, ctx, bb)? {
                    self.tick_node(then_branch, ctx, bb, dt)
                } else if let Some(else_branch) = else_branch {
                    self.tick_node(else_branch, ctx, bb, dt)
                } else {
                    Ok(BtStatus::Failure)
                }
            }
            IrKind::Invert(body) => Ok(self.tick_node(body, ctx, bb, dt)?.inverted()),
            IrKind::Repeat { count, body } => self.tick_repeat(ir.id, *count, body, ctx, bb, dt),
            IrKind::Timeout { seconds, body } => self.tick_timeout(ir.id, *seconds, body, ctx, bb, dt),
            IrKind::Cooldown { seconds, body } => self.tick_cooldown(ir.id, *seconds, body, ctx, bb, dt),
            IrKind::While { cond, body } => {
                if self.truthy_cond(cond, ctx, bb)? {
                    self.tick_node(body, ctx, bb, dt)
                } else {
                    Ok(BtStatus::Success)
                }
            }
            IrKind::Reactive { cond, body } => self.tick_reactive(ir.id, cond, body, ctx, bb, dt),
            IrKind::TreeRef(name) => Err(RuntimeError::UnsupportedTreeRef(name.clone())),
            IrKind::Condition(expr) => {
                if self.truthy_cond(expr, ctx, bb)? {
                    Ok(BtStatus::Success)
                } else {
                    Ok(BtStatus::Failure)
                }
            }
            IrKind::Action { declaring_type, name, args } => {
                let values = self.eval_args(args, ctx, bb)?;
                let result = ctx.invoke(declaring_type, name, &values)?;
                match result {
                    Value::BtStatus(s) => Ok(s),
                    other => Err(RuntimeError::NonBtStatusReturn(name.clone(), other)),
                }
            }
            // `Call` only ever appears in expression position in a well-formed
            // tree; reaching it here means a tree was ticked as a node despite
            // being typed as a plain value. Evaluate it and coerce like Action
            // so a malformed or hand-built tree still fails structurally.
            IrKind::Call { declaring_type, name, args } => {
                let values = self.eval_args(args, ctx, bb)?;
                let result = ctx.invoke(declaring_type, name, &values)?;
                match result {
                    Value::BtStatus(s) => Ok(s),
                    other => Err(RuntimeError::NonBtStatusReturn(name.clone(), other)),
                }
            }
            IrKind::BinaryOp { .. }
            | IrKind::UnaryOp { .. }
            | IrKind::LogicOp { .. }
            | IrKind::Literal(_)
            | IrKind::MemberLoad(_)
            | IrKind::BlackboardLoad(_)
            | IrKind::Convert(..) => {
                // Expression-kind IR reached in node position: only valid if it
                // is a boolean-typed value (mirrors `Condition`'s semantics).
                if self.truthy(self.eval_expr(ir, ctx, bb)?)? {
                    Ok(BtStatus::Success)
                } else {
                    Ok(BtStatus::Failure)
                }
            }
        }
    }

    fn truthy_cond(&mut self, cond: &Ir, ctx: &mut dyn Context, bb: Option<&dyn Blackboard>) -> Result<bool, RuntimeError> {
        let v = self.eval_expr(cond, ctx, bb)?;
        self.truthy(v)
    }

    fn truthy(&self, v: Value) -> Result<bool, RuntimeError> {
        match v {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::NonBoolCondition(other)),
        }
    }

    fn eval_args(&mut self, args: &[Ir], ctx: &mut dyn Context, bb: Option<&dyn Blackboard>) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|a| self.eval_expr(a, ctx, bb)).collect()
    }

    fn eval_expr(&self, ir: &Ir, ctx: &mut dyn Context, bb: Option<&dyn Blackboard>) -> Result<Value, RuntimeError> {
        match &ir.kind {
            IrKind::Literal(lit) => Ok(Value::from_literal(lit)),
            IrKind::MemberLoad(path) => ctx.member(path),
            IrKind::BlackboardLoad(path) => bb.ok_or(RuntimeError::NoBlackboard)?.member(path),
            IrKind::Call { declaring_type, name, args } => {
                let values: Vec<Value> = args.iter().map(|a| self.eval_expr(a, ctx, bb)).collect::<Result<_, _>>()?;
                ctx.invoke(declaring_type, name, &values)
            }
            IrKind::BinaryOp { op, lhs, rhs } => {
                let l = self.eval_expr(lhs, ctx, bb)?;
                let r = self.eval_expr(rhs, ctx, bb)?;
                eval_binary(*op, l, r)
            }
            IrKind::UnaryOp { op, operand } => {
                let v = self.eval_expr(operand, ctx, bb)?;
                eval_unary(*op, v)
            }
            IrKind::LogicOp { is_and, operands } => {
                for (i, operand) in operands.iter().enumerate() {
                    let v = self.eval_expr(operand, ctx, bb)?;
                    let b = match v {
                        Value::Bool(b) => b,
                        other => return Err(RuntimeError::NonBoolCondition(other)),
                    };
                    let short_circuits = if *is_and { !b } else { b };
                    if short_circuits {
                        return Ok(Value::Bool(b));
                    }
                    if i == operands.len() - 1 {
                        return Ok(Value::Bool(b));
                    }
                }
                Ok(Value::Bool(*is_and))
            }
            IrKind::Convert(inner, to) => {
                let v = self.eval_expr(inner, ctx, bb)?;
                eval_convert(v, to)
            }
            // A composite reached in expression position has no sensible
            // value; this cannot occur from a tree produced by lowering.
            other => Err(RuntimeError::NonBoolCondition(Value::String(format!("{other:?}")))),
        }
    }

    fn tick_repeat(
        &mut self,
        id: Option<u32>,
        count: i32,
        body: &Ir,
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        let mut remaining = match id.and_then(|id| self.state.get(&id)) {
            Some(NodeState::Repeat { remaining }) => *remaining,
            _ => count,
        };
        loop {
            if remaining <= 0 {
                if let Some(id) = id {
                    self.state.shift_remove(&id);
                }
                return Ok(BtStatus::Success);
            }
            match self.tick_node(body, ctx, bb, dt)? {
                BtStatus::Failure => {
                    if let Some(id) = id {
                        self.state.shift_remove(&id);
                    }
                    return Ok(BtStatus::Failure);
                }
                BtStatus::Running => {
                    if let Some(id) = id {
                        self.state.insert(id, NodeState::Repeat { remaining });
                    }
                    return Ok(BtStatus::Running);
                }
                BtStatus::Success => remaining -= 1,
            }
        }
    }

    fn tick_timeout(
        &mut self,
        id: Option<u32>,
        seconds: f32,
        body: &Ir,
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        let elapsed = match id.and_then(|id| self.state.get(&id)) {
            Some(NodeState::Timeout { elapsed }) => *elapsed,
            _ => 0.0,
        };
        match self.tick_node(body, ctx, bb, dt)? {
            BtStatus::Running => {
                let elapsed = elapsed + dt;
                if elapsed >= seconds {
                    self.abort_subtree(body);
                    if let Some(id) = id {
                        self.state.shift_remove(&id);
                    }
                    Ok(BtStatus::Failure)
                } else {
                    if let Some(id) = id {
                        self.state.insert(id, NodeState::Timeout { elapsed });
                    }
                    Ok(BtStatus::Running)
                }
            }
            done => {
                if let Some(id) = id {
                    self.state.shift_remove(&id);
                }
                Ok(done)
            }
        }
    }

    fn tick_cooldown(
        &mut self,
        id: Option<u32>,
        seconds: f32,
        body: &Ir,
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        if let Some(NodeState::Cooldown { remaining }) = id.and_then(|id| self.state.get(&id)).copied() {
            if remaining > 0.0 {
                let remaining = (remaining - dt).max(0.0);
                if remaining > 0.0 {
                    if let Some(id) = id {
                        self.state.insert(id, NodeState::Cooldown { remaining });
                    }
                    return Ok(BtStatus::Failure);
                }
                if let Some(id) = id {
                    self.state.shift_remove(&id);
                }
            }
        }
        match self.tick_node(body, ctx, bb, dt)? {
            BtStatus::Success => {
                if let Some(id) = id {
                    self.state.insert(id, NodeState::Cooldown { remaining: seconds });
                }
                Ok(BtStatus::Success)
            }
            other => Ok(other),
        }
    }

    fn tick_reactive(
        &mut self,
        id: Option<u32>,
        cond: &Ir,
        body: &Ir,
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        let was_running = matches!(id.and_then(|id| self.state.get(&id)), Some(NodeState::Reactive { running: true }));
        if !self.truthy_cond(cond, ctx, bb)? {
            if was_running {
                self.abort_subtree(body);
            }
            if let Some(id) = id {
                self.state.insert(id, NodeState::Reactive { running: false });
            }
            return Ok(BtStatus::Failure);
        }
        let result = self.tick_node(body, ctx, bb, dt)?;
        if let Some(id) = id {
            self.state.insert(id, NodeState::Reactive { running: result.is_running() });
        }
        Ok(result)
    }

    fn tick_reactive_select(
        &mut self,
        id: Option<u32>,
        children: &[Ir],
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        let prev_running = match id.and_then(|id| self.state.get(&id)) {
            Some(NodeState::ReactiveSelect { running_index }) => *running_index,
            _ => None,
        };
        for (i, child) in children.iter().enumerate() {
            let result = self.tick_node(child, ctx, bb, dt)?;
            if result != BtStatus::Failure {
                if let Some(prev) = prev_running {
                    if prev != i {
                        self.abort_subtree(&children[prev]);
                    }
                }
                if let Some(id) = id {
                    let running_index = if result.is_running() { Some(i) } else { None };
                    self.state.insert(id, NodeState::ReactiveSelect { running_index });
                }
                return Ok(result);
            }
        }
        if let Some(prev) = prev_running {
            self.abort_subtree(&children[prev]);
        }
        if let Some(id) = id {
            self.state.shift_remove(&id);
        }
        Ok(BtStatus::Failure)
    }

    fn tick_parallel(
        &mut self,
        policy: ParallelPolicy,
        children: &[Ir],
        ctx: &mut dyn Context,
        bb: Option<&dyn Blackboard>,
        dt: f32,
    ) -> Result<BtStatus, RuntimeError> {
        let mut successes = 0usize;
        let mut failures = 0usize;
        let mut running = 0usize;
        for child in children {
            match self.tick_node(child, ctx, bb, dt)? {
                BtStatus::Success => successes += 1,
                BtStatus::Failure => failures += 1,
                BtStatus::Running => running += 1,
            }
        }
        Ok(match policy {
            ParallelPolicy::Any => {
                if successes > 0 {
                    BtStatus::Success
                } else if running > 0 {
                    BtStatus::Running
                } else {
                    BtStatus::Failure
                }
            }
            ParallelPolicy::All => {
                if failures > 0 {
                    BtStatus::Failure
                } else if running > 0 {
                    BtStatus::Running
                } else {
                    BtStatus::Success
                }
            }
            ParallelPolicy::N(k) => {
                let k = k.max(0) as usize;
                if successes >= k {
                    BtStatus::Success
                } else if successes + running < k {
                    BtStatus::Failure
                } else {
                    BtStatus::Running
                }
            }
        })
    }

    /// Clears state for `ir` and every descendant, mirroring the `Reset`
    /// the host is expected to apply when `Timeout`/`Reactive`/
    /// `ReactiveSelect` abort a running subtree (spec §5).
    fn abort_subtree(&mut self, ir: &Ir) {
        if let Some(id) = ir.id {
            self.state.shift_remove(&id);
        }
        for child in ir.children() {
            self.abort_subtree(child);
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    use Value::*;
    match (&lhs, &rhs) {
        (Int(a), Int(b)) => {
            if op.is_comparison() {
                return Ok(Bool(compare(*a as f64, *b as f64, op)));
            }
            match op {
                BinaryOp::Add => Ok(Int(a.wrapping_add(*b))),
                BinaryOp::Sub => Ok(Int(a.wrapping_sub(*b))),
                BinaryOp::Mul => Ok(Int(a.wrapping_mul(*b))),
                BinaryOp::Div if *b != 0 => Ok(Int(a.wrapping_div(*b))),
                BinaryOp::Mod if *b != 0 => Ok(Int(a.wrapping_rem(*b))),
                BinaryOp::Div | BinaryOp::Mod => Err(RuntimeError::DivisionByZero),
                _ => Err(type_mismatch(op, lhs, rhs)),
            }
        }
        (Float(a), Float(b)) => {
            if op.is_comparison() {
                return Ok(Bool(compare(*a as f64, *b as f64, op)));
            }
            match op {
                BinaryOp::Add => Ok(Float(a + b)),
                BinaryOp::Sub => Ok(Float(a - b)),
                BinaryOp::Mul => Ok(Float(a * b)),
                BinaryOp::Div if *b != 0.0 => Ok(Float(a / b)),
                BinaryOp::Mod if *b != 0.0 => Ok(Float(a % b)),
                BinaryOp::Div | BinaryOp::Mod => Err(RuntimeError::DivisionByZero),
                _ => Err(type_mismatch(op, lhs, rhs)),
            }
        }
        (Bool(a), Bool(b)) => match op {
            BinaryOp::Eq => Ok(Bool(a == b)),
            BinaryOp::Ne => Ok(Bool(a != b)),
            _ => Err(type_mismatch(op, lhs, rhs)),
        },
        (String(a), String(b)) => match op {
            BinaryOp::Eq => Ok(Bool(a == b)),
            BinaryOp::Ne => Ok(Bool(a != b)),
            _ => Err(type_mismatch(op, lhs, rhs)),
        },
        (Null, Null) => match op {
            BinaryOp::Eq => Ok(Bool(true)),
            BinaryOp::Ne => Ok(Bool(false)),
            _ => Err(type_mismatch(op, lhs, rhs)),
        },
        (Enum(t1, m1), Enum(t2, m2)) => match op {
            BinaryOp::Eq => Ok(Bool(t1 == t2 && m1 == m2)),
            BinaryOp::Ne => Ok(Bool(t1 != t2 || m1 != m2)),
            _ => Err(type_mismatch(op, lhs, rhs)),
        },
        _ => Err(type_mismatch(op, lhs, rhs)),
    }
}

fn type_mismatch(op: BinaryOp, lhs: Value, rhs: Value) -> RuntimeError {
    RuntimeError::TypeMismatch { op: format!("{op:?}"), lhs, rhs }
}

fn compare(a: f64, b: f64, op: BinaryOp) -> bool {
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Le => a <= b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => unreachable!("non-comparison operator routed through compare()"),
    }
}

fn eval_unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
        (UnaryOp::Negate, Value::Float(v)) => Ok(Value::Float(-v)),
        (op, v) => Err(RuntimeError::TypeMismatch { op: format!("{op:?}"), lhs: v, rhs: Value::Null }),
    }
}

fn eval_convert(v: Value, to: &TypeRef) -> Result<Value, RuntimeError> {
    match (v, to) {
        (Value::Int(i), TypeRef::Float) => Ok(Value::Float(i as f32)),
        (Value::Float(f), TypeRef::Int) => Ok(Value::Int(f as i32)),
        (v, TypeRef::Int) if v.type_name() == "Int" => Ok(v),
        (v, TypeRef::Float) if v.type_name() == "Float" => Ok(v),
        (v, to) => Err(RuntimeError::UnsupportedConversion(to.to_string(), v)),
    }
}

#[cfg(test)]
mod interpreter_tests {
    use super::*;
    use crisp_core::Span;

    struct TestHost {
        health: i32,
        flee_calls: u32,
        patrol_calls: u32,
    }

    impl Context for TestHost {
        fn member(&self, path: &[String]) -> Result<Value, RuntimeError> {
            match path {
                [p] if p == "Health" => Ok(Value::Int(self.health)),
                _ => Err(RuntimeError::MissingMember(path.join("."))),
            }
        }

        fn invoke(&mut self, _declaring_type: &str, name: &str, _args: &[Value]) -> Result<Value, RuntimeError> {
            match name {
                "Flee" => {
                    self.flee_calls += 1;
                    Ok(Value::BtStatus(BtStatus::Success))
                }
                "Patrol" => {
                    self.patrol_calls += 1;
                    Ok(Value::BtStatus(BtStatus::Running))
                }
                other => Err(RuntimeError::MissingMember(other.to_string())),
            }
        }
    }

    fn action(name: &str) -> Ir {
        Ir {
            id: Some(0),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Action { declaring_type: "this".to_string(), name: name.to_string(), args: vec![] },
        }
    }

    fn lit_int(n: i32) -> Ir {
        Ir { id: None, ty: TypeRef::Int, span: Span::empty(0), kind: IrKind::Literal(Literal::Int(n)) }
    }

    #[test]
    fn selector_returns_the_first_non_failure_child() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir {
            id: Some(1),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Selector(vec![action("Patrol")]),
        };
        let status = interp.tick(&ir, &mut host, None, 0.1).unwrap();
        assert_eq!(status, BtStatus::Running);
        assert_eq!(host.patrol_calls, 1);
    }

    #[test]
    fn invert_swaps_success_and_failure_but_not_running() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir { id: Some(2), ty: TypeRef::BtStatus, span: Span::empty(0), kind: IrKind::Invert(Box::new(action("Flee"))) };
        let status = interp.tick(&ir, &mut host, None, 0.1).unwrap();
        assert_eq!(status, BtStatus::Failure);
    }

    #[test]
    fn repeat_counts_down_across_ticks_while_the_body_succeeds() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir {
            id: Some(3),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Repeat { count: 2, body: Box::new(action("Flee")) },
        };
        let status = interp.tick(&ir, &mut host, None, 0.1).unwrap();
        assert_eq!(status, BtStatus::Success);
        assert_eq!(host.flee_calls, 2);
    }

    #[test]
    fn timeout_runs_twice_then_fails_and_resets_its_accumulator() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir {
            id: Some(4),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Timeout { seconds: 1.0, body: Box::new(action("Patrol")) },
        };
        assert_eq!(interp.tick(&ir, &mut host, None, 0.6).unwrap(), BtStatus::Running);
        assert_eq!(interp.tick(&ir, &mut host, None, 0.6).unwrap(), BtStatus::Failure);
        assert!(!interp.state.contains_key(&4));
        assert_eq!(interp.tick(&ir, &mut host, None, 0.6).unwrap(), BtStatus::Running);
    }

    #[test]
    fn cooldown_blocks_retries_until_the_timer_elapses() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir {
            id: Some(5),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Cooldown { seconds: 1.0, body: Box::new(action("Flee")) },
        };
        assert_eq!(interp.tick(&ir, &mut host, None, 0.1).unwrap(), BtStatus::Success);
        assert_eq!(host.flee_calls, 1);
        assert_eq!(interp.tick(&ir, &mut host, None, 0.5).unwrap(), BtStatus::Failure);
        assert_eq!(host.flee_calls, 1);
        assert_eq!(interp.tick(&ir, &mut host, None, 0.6).unwrap(), BtStatus::Success);
        assert_eq!(host.flee_calls, 2);
    }

    #[test]
    fn condition_reads_a_member_and_compares_it() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 20, flee_calls: 0, patrol_calls: 0 };
        let cond = Ir {
            id: None,
            ty: TypeRef::Bool,
            span: Span::empty(0),
            kind: IrKind::BinaryOp {
                op: BinaryOp::Lt,
                lhs: Box::new(Ir {
                    id: None,
                    ty: TypeRef::Int,
                    span: Span::empty(0),
                    kind: IrKind::MemberLoad(vec!["Health".to_string()]),
                }),
                rhs: Box::new(lit_int(30)),
            },
        };
        let ir = Ir { id: Some(6), ty: TypeRef::BtStatus, span: Span::empty(0), kind: IrKind::Condition(Box::new(cond)) };
        assert_eq!(interp.tick(&ir, &mut host, None, 0.1).unwrap(), BtStatus::Success);
    }

    #[test]
    fn tree_ref_is_a_structured_unsupported_error_not_a_panic() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir { id: Some(7), ty: TypeRef::BtStatus, span: Span::empty(0), kind: IrKind::TreeRef("Other".to_string()) };
        let err = interp.tick(&ir, &mut host, None, 0.1).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedTreeRef(_)));
    }

    #[test]
    fn reset_clears_state_so_repeat_starts_over() {
        let mut interp = Interpreter::new();
        let mut host = TestHost { health: 10, flee_calls: 0, patrol_calls: 0 };
        let ir = Ir {
            id: Some(8),
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Repeat { count: 3, body: Box::new(action("Patrol")) },
        };
        interp.tick(&ir, &mut host, None, 0.1).unwrap();
        assert!(interp.state.contains_key(&8));
        interp.reset();
        assert!(interp.state.is_empty());
    }
}
