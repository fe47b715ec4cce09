/// Chain parameters and gas schedule
pub mod chainspec;

/// Linear Poseidon hashing of contract bytecode
pub mod codehash;

/// Virtual counter accumulation for the proving-cost model
pub mod counters;

/// The environment interface behind a call frame
pub mod env;

/// Jump-destination bitmaps and their cache
pub mod jumpmap;

/// Log records emitted by the LOG opcodes
pub mod log;

/// Memory implementation for VM memory management
pub mod memory;

/// Opcode definitions and static metadata
pub mod opcodes;

/// Stack implementation for the VM
pub mod stack;

/// Subroutine return stack
pub mod substack;

/// Trap codes that end a frame
pub mod trap;

/// Core virtual machine implementation
pub mod vm;
