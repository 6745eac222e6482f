//! Per-node state (spec §4.11, §9): only the stateful decorators need to
//! remember anything between ticks. Keyed by the node's stable id (spec
//! §4.7) in the interpreter's state map.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeState {
    Repeat { remaining: i32 },
    Timeout { elapsed: f32 },
    Cooldown { remaining: f32 },
    Reactive { running: bool },
    ReactiveSelect { running_index: Option<usize> },
}
