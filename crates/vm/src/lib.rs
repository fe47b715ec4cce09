//! zkEVM bytecode interpreter.
//!
//! This crate executes EVM bytecode one opcode at a time against a frame-
//! local stack and memory, reaching world state through an abstract
//! environment interface, and records the virtual counter side-stream a
//! zero-knowledge prover consumes to bound proving cost.

/// Core interpreter implementation: stack, memory, opcodes, dispatch, and
/// virtual counters
pub mod core;
