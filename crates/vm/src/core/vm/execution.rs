use super::super::{counters::VirtualCounters, stack::Stack, trap::Trap};

/// Why a frame stopped executing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// STOP, or execution ran past the end of code.
    Stop,
    /// RETURN handed output to the environment.
    Return,
    /// REVERT: failure that preserves output and unused gas.
    Revert,
    /// SELFDESTRUCT queued its state changes and ended the frame.
    SelfDestruct,
    /// A frame-fatal trap fired.
    Trapped(Trap),
}

impl HaltReason {
    /// Whether the caller observes a success status word.
    pub fn is_success(&self) -> bool {
        matches!(self, HaltReason::Stop | HaltReason::Return | HaltReason::SelfDestruct)
    }
}

/// [`ExecutionResult`] is the result of running a frame to completion.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    /// Status word observed by the caller: 1 on success, 0 on failure.
    pub return_code: u32,

    /// Output handed to the caller. Empty after a trap; the RETURN or REVERT
    /// payload otherwise.
    pub output: Vec<u8>,

    /// The amount of gas consumed during the execution.
    pub gas_used: u128,

    /// The amount of gas left after execution completes.
    pub gas_remaining: u128,

    /// Why the frame halted.
    pub halt: HaltReason,

    /// Virtual counters accumulated by the frame.
    pub counters: VirtualCounters,
}

/// [`State`] is a snapshot of the frame after executing a single
/// instruction, returned by [`VM::step`](super::core::VM::step) for tracing
/// consumers.
#[derive(Clone, Debug)]
pub struct State {
    /// Position of the executed instruction in the bytecode.
    pub pc: usize,

    /// The opcode value of the executed instruction.
    pub opcode: u8,

    /// The total amount of gas used so far during execution.
    pub gas_used: u128,

    /// The amount of gas remaining for execution.
    pub gas_remaining: u128,

    /// The current state of the word stack.
    pub stack: Stack,

    /// Memory high-water mark in 32-byte words.
    pub memory_words: usize,
}
