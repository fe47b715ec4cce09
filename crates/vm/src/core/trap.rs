use thiserror::Error;

use super::opcodes;

/// Signals that end a call frame.
///
/// Traps are signaling values, not error messages: the dispatch loop matches
/// on them to decide how the frame unwinds. [`Trap::Stop`] is the one
/// non-erroneous member (STOP, or execution running past the end of code);
/// every other variant is frame-fatal and consumes the remaining gas.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trap {
    /// Non-erroneous halt.
    #[error("stop")]
    Stop,
    /// Gas allowance exhausted.
    #[error("out of gas")]
    OutOfGas,
    /// Opcode byte has no handler.
    #[error("invalid opcode")]
    InvalidOpcode,
    /// JUMP/JUMPI target is past the end of code or not a JUMPDEST.
    #[error("invalid jump destination")]
    InvalidJump,
    /// JUMPSUB target is past the end of code or not a BEGINSUB.
    #[error("invalid subroutine destination")]
    InvalidJumpSub,
    /// BEGINSUB reached by fall-through instead of JUMPSUB.
    #[error("subroutine entry reached by fall-through")]
    InvalidBeginSub,
    /// RETURNSUB with an empty return stack.
    #[error("return from empty subroutine stack")]
    InvalidReturnSub,
    /// State-changing opcode inside a static context.
    #[error("state change in static context")]
    StaticStateChange,
    /// Operand does not fit the addressable range.
    #[error("operand out of range")]
    OutOfRange,
    /// Word stack grew past its limit.
    #[error("stack overflow")]
    StackOverflow,
    /// Word stack had fewer operands than the opcode pops.
    #[error("stack underflow")]
    StackUnderflow,
}

impl Trap {
    /// Whether this is the non-erroneous STOP signal.
    pub fn is_stop(&self) -> bool {
        matches!(self, Trap::Stop)
    }
}

/// Renders a trap together with the program counter and opcode it fired at.
pub fn describe_location(trap: Trap, pc: usize, opcode: u8) -> String {
    format!("{trap} at pc={pc} ({})", opcodes::opcode_name(opcode))
}
