use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use hashbrown::HashSet;
use tracing::trace;

use crate::core::{
    chainspec::ChainSpec,
    counters::VirtualCounters,
    env::Environment,
    jumpmap::JumpMap,
    memory::Memory,
    opcodes::{self, OpCodeInfo},
    stack::Stack,
    substack::ReturnStack,
    trap::{describe_location, Trap},
};

use super::{
    execution::{ExecutionResult, HaltReason, State},
    handlers,
};

/// Immutable per-frame context, fixed for the frame's lifetime.
#[derive(Clone, Debug, Default)]
pub struct FrameEnv {
    /// The address of the executing contract.
    pub address: Address,

    /// The address that directly called this contract.
    pub caller: Address,

    /// The address that originated the transaction.
    pub origin: Address,

    /// The amount of ether sent with the call (in wei).
    pub value: U256,

    /// The input data provided to the contract call.
    pub calldata: Vec<u8>,

    /// The gas price of the enclosing transaction.
    pub gas_price: U256,

    /// Call depth of this frame (0 for the transaction root).
    pub depth: usize,

    /// Nonce of the executing contract.
    pub nonce: u64,

    /// Whether the frame runs in a static context (no observable state
    /// changes allowed).
    pub is_static: bool,

    /// Whether the frame runs constructor code (CREATE/CREATE2).
    pub is_create: bool,

    /// Whether the enclosing transaction deploys a contract.
    pub is_deploy: bool,
}

/// The [`VM`] struct is the run state of a single call frame.
///
/// It owns the frame's [`Stack`], [`Memory`], [`ReturnStack`], program
/// counter, gas allowance, and virtual counter accumulator. The world
/// outside the frame is reached exclusively through the
/// [`Environment`] passed into [`VM::step`] and [`VM::execute`].
#[derive(Clone, Debug)]
pub struct VM {
    /// The word stack.
    pub stack: Stack,

    /// The byte-addressable memory.
    pub memory: Memory,

    /// The subroutine return stack.
    pub returnstack: ReturnStack,

    /// The current program counter into `bytecode`.
    pub pc: usize,

    /// The compiled bytecode being executed.
    pub bytecode: Vec<u8>,

    /// Jump-destination bitmaps, shared across frames running this code.
    pub jumpmap: Arc<JumpMap>,

    /// Immutable frame context.
    pub env: FrameEnv,

    /// Chain parameters and gas schedule.
    pub spec: ChainSpec,

    /// The amount of gas remaining for execution.
    pub gas_remaining: u128,

    /// The amount of gas used so far during execution.
    pub gas_used: u128,

    /// Return buffer of the most recent completed sub-call.
    pub returndata: Vec<u8>,

    /// Output of this frame once halted.
    pub output: Vec<u8>,

    /// Set once the frame stops executing.
    pub halt: Option<HaltReason>,

    /// Virtual counter accumulator feeding the proving-cost model.
    pub counters: VirtualCounters,

    /// Gas reserved by the dispatch loop for the next sub-frame; the call
    /// family consumes it exactly once.
    pub message_gas_limit: Option<u128>,

    /// Addresses touched by this frame (warm-access pricing).
    pub warm_addresses: HashSet<Address>,

    /// Storage keys touched by this frame (warm-access pricing).
    pub warm_slots: HashSet<B256>,
}

impl VM {
    /// Creates a new [`VM`] for one call frame with the given bytecode,
    /// frame context, chain parameters, and gas allowance.
    pub fn new(bytecode: &[u8], env: FrameEnv, spec: ChainSpec, gas_limit: u128) -> VM {
        VM {
            stack: Stack::new(),
            memory: Memory::new(),
            returnstack: ReturnStack::new(),
            pc: 0,
            jumpmap: JumpMap::shared(bytecode),
            bytecode: bytecode.to_vec(),
            counters: VirtualCounters::new(env.is_create, env.is_deploy),
            env,
            spec,
            gas_remaining: gas_limit,
            gas_used: 0,
            returndata: Vec::new(),
            output: Vec::new(),
            halt: None,
            message_gas_limit: None,
            warm_addresses: HashSet::new(),
            warm_slots: HashSet::new(),
        }
    }

    /// Marks the frame halted with the given reason and output.
    pub(crate) fn exit(&mut self, reason: HaltReason, output: Vec<u8>) {
        self.output = output;
        self.halt = Some(reason);
    }

    /// Consume gas units, trapping with OUT_OF_GAS if the allowance is
    /// exceeded. An exceeded allowance is consumed entirely.
    pub fn consume_gas(&mut self, amount: u128, reason: &'static str) -> Result<(), Trap> {
        if amount > self.gas_remaining {
            trace!(amount, reason, remaining = self.gas_remaining, "gas allowance exceeded");
            self.gas_used = self.gas_used.saturating_add(self.gas_remaining);
            self.gas_remaining = 0;
            return Err(Trap::OutOfGas);
        }

        self.gas_remaining -= amount;
        self.gas_used = self.gas_used.saturating_add(amount);
        Ok(())
    }

    /// Push a boolean value onto the stack
    pub(crate) fn push_boolean(&mut self, condition: bool) -> Result<(), Trap> {
        let value = if condition { U256::from(1u8) } else { U256::ZERO };
        self.stack.push(value)
    }

    /// Convert an address to a stack word
    pub(crate) fn address_to_word(address: &Address) -> U256 {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_ref());
        U256::from_be_bytes(word)
    }

    /// Convert a stack word to an address (low 20 bytes)
    pub(crate) fn word_to_address(word: U256) -> Address {
        Address::from_slice(&word.to_be_bytes::<32>()[12..])
    }

    /// Convert a stack word to a usize offset, trapping when it does not fit
    /// the addressable range
    pub(crate) fn word_to_usize(word: U256) -> Result<usize, Trap> {
        word.try_into().map_err(|_| Trap::OutOfRange)
    }

    /// Safely copy data from source with bounds checking, zero-filling the
    /// tail when the source runs out
    pub(crate) fn safe_copy_data(source: &[u8], offset: usize, size: usize) -> Vec<u8> {
        let end_offset = offset.saturating_add(size).min(source.len());
        let mut value = source.get(offset..end_offset).unwrap_or(&[]).to_owned();
        if value.len() < size {
            value.resize(size, 0u8);
        }
        value
    }

    /// Account access pricing: the first touch in a frame is cold.
    pub(crate) fn account_access_cost(&mut self, address: Address) -> u128 {
        if self.warm_addresses.contains(&address) {
            self.spec.gas.warm_access as u128
        } else {
            self.warm_addresses.insert(address);
            self.spec.gas.cold_account_access as u128
        }
    }

    /// Storage access pricing: the first touch of a key in a frame is cold.
    pub(crate) fn storage_access_cost(&mut self, key: B256) -> u128 {
        if self.warm_slots.contains(&key) {
            self.spec.gas.warm_access as u128
        } else {
            self.warm_slots.insert(key);
            self.spec.gas.cold_sload as u128
        }
    }

    /// Takes the dispatch loop's message-gas reservation. The call family
    /// consumes it exactly once per invocation.
    pub(crate) fn take_message_gas(&mut self) -> Result<u128, Trap> {
        self.message_gas_limit.take().ok_or(Trap::OutOfGas)
    }

    /// Executes the instruction at the current program counter. Returns the
    /// trap that ended the frame, if one fired.
    fn dispatch(&mut self, env: &mut dyn Environment) -> Result<(), Trap> {
        // fetch; running past the end of code is an implicit STOP
        let opcode = self.bytecode.get(self.pc).copied().unwrap_or(opcodes::STOP);
        self.pc += 1;

        let info = OpCodeInfo::lookup(opcode).ok_or(Trap::InvalidOpcode)?;

        // state-changing opcodes trap inside a static context before
        // touching anything; value-carrying CALL is checked in its handler
        if self.env.is_static && !info.is_view() {
            return Err(Trap::StaticStateChange);
        }

        self.consume_gas(info.min_gas() as u128, info.name())?;

        // the call family runs its sub-frame on a pre-reserved allowance of
        // all but a 64th of the remaining gas
        if matches!(
            opcode,
            opcodes::CREATE |
                opcodes::CALL |
                opcodes::CALLCODE |
                opcodes::DELEGATECALL |
                opcodes::CREATE2 |
                opcodes::STATICCALL
        ) {
            self.message_gas_limit = Some(self.gas_remaining - self.gas_remaining / 64);
        }

        match opcode {
            opcodes::STOP => handlers::control::stop(self, env),

            opcodes::ADD => handlers::arithmetic::add(self),
            opcodes::MUL => handlers::arithmetic::mul(self),
            opcodes::SUB => handlers::arithmetic::sub(self),
            opcodes::DIV => handlers::arithmetic::div(self),
            opcodes::SDIV => handlers::arithmetic::sdiv(self),
            opcodes::MOD => handlers::arithmetic::modulo(self),
            opcodes::SMOD => handlers::arithmetic::smod(self),
            opcodes::ADDMOD => handlers::arithmetic::addmod(self),
            opcodes::MULMOD => handlers::arithmetic::mulmod(self),
            opcodes::EXP => handlers::arithmetic::exp(self),
            opcodes::SIGNEXTEND => handlers::arithmetic::signextend(self),

            opcodes::LT => handlers::comparison::lt(self),
            opcodes::GT => handlers::comparison::gt(self),
            opcodes::SLT => handlers::comparison::slt(self),
            opcodes::SGT => handlers::comparison::sgt(self),
            opcodes::EQ => handlers::comparison::eq(self),
            opcodes::ISZERO => handlers::comparison::iszero(self),

            opcodes::AND => handlers::bitwise::and(self),
            opcodes::OR => handlers::bitwise::or(self),
            opcodes::XOR => handlers::bitwise::xor(self),
            opcodes::NOT => handlers::bitwise::not(self),
            opcodes::BYTE => handlers::bitwise::byte(self),
            opcodes::SHL => handlers::bitwise::shl(self),
            opcodes::SHR => handlers::bitwise::shr(self),
            opcodes::SAR => handlers::bitwise::sar(self),

            opcodes::SHA3 => handlers::crypto::sha3(self),

            opcodes::ADDRESS => handlers::environment::address(self),
            opcodes::BALANCE => handlers::environment::balance(self, env),
            opcodes::ORIGIN => handlers::environment::origin(self),
            opcodes::CALLER => handlers::environment::caller(self),
            opcodes::CALLVALUE => handlers::environment::callvalue(self),
            opcodes::CALLDATALOAD => handlers::environment::calldataload(self),
            opcodes::CALLDATASIZE => handlers::environment::calldatasize(self),
            opcodes::CALLDATACOPY => handlers::environment::calldatacopy(self),
            opcodes::CODESIZE => handlers::environment::codesize(self),
            opcodes::CODECOPY => handlers::environment::codecopy(self),
            opcodes::GASPRICE => handlers::environment::gasprice(self),
            opcodes::EXTCODESIZE => handlers::environment::extcodesize(self, env),
            opcodes::EXTCODECOPY => handlers::environment::extcodecopy(self, env),
            opcodes::RETURNDATASIZE => handlers::environment::returndatasize(self),
            opcodes::RETURNDATACOPY => handlers::environment::returndatacopy(self),
            opcodes::EXTCODEHASH => handlers::environment::extcodehash(self, env),
            opcodes::BLOCKHASH => handlers::environment::blockhash(self, env),

            opcodes::COINBASE => handlers::block::coinbase(self, env),
            opcodes::TIMESTAMP => handlers::block::timestamp(self, env),
            opcodes::NUMBER => handlers::block::number(self, env),
            opcodes::DIFFICULTY => handlers::block::difficulty(self, env),
            opcodes::GASLIMIT => handlers::block::gaslimit(self, env),
            opcodes::CHAINID => handlers::block::chainid(self),
            opcodes::SELFBALANCE => handlers::block::selfbalance(self, env),
            opcodes::BASEFEE => handlers::block::basefee(self, env),

            opcodes::POP => handlers::stack::pop(self),
            opcodes::MLOAD => handlers::memory::mload(self),
            opcodes::MSTORE => handlers::memory::mstore(self),
            opcodes::MSTORE8 => handlers::memory::mstore8(self),
            opcodes::SLOAD => handlers::storage::sload(self, env),
            opcodes::SSTORE => handlers::storage::sstore(self, env),
            opcodes::JUMP => handlers::control::jump(self),
            opcodes::JUMPI => handlers::control::jumpi(self),
            opcodes::PC => handlers::control::pc(self),
            opcodes::MSIZE => handlers::memory::msize(self),
            opcodes::GAS => handlers::control::gas(self),
            opcodes::JUMPDEST => handlers::control::jumpdest(self),
            opcodes::BEGINSUB => handlers::control::beginsub(self),
            opcodes::RETURNSUB => handlers::control::returnsub(self),
            opcodes::JUMPSUB => handlers::control::jumpsub(self),

            (opcodes::PUSH1..=opcodes::PUSH32) => handlers::stack::push_n(self, opcode),
            (opcodes::DUP1..=opcodes::DUP16) => handlers::stack::dup_n(self, opcode),
            (opcodes::SWAP1..=opcodes::SWAP16) => handlers::stack::swap_n(self, opcode),

            (opcodes::LOG0..=opcodes::LOG4) => handlers::logging::log_n(self, env, opcode),

            opcodes::CREATE => handlers::system::create(self, env),
            opcodes::CALL => handlers::system::call(self, env),
            opcodes::CALLCODE => handlers::system::callcode(self, env),
            opcodes::RETURN => handlers::system::op_return(self, env),
            opcodes::DELEGATECALL => handlers::system::delegatecall(self, env),
            opcodes::CREATE2 => handlers::system::create2(self, env),
            opcodes::STATICCALL => handlers::system::staticcall(self, env),
            opcodes::REVERT => handlers::system::revert(self, env),
            opcodes::SELFDESTRUCT => handlers::system::selfdestruct(self, env),

            _ => Err(Trap::InvalidOpcode),
        }
    }

    /// Unwinds the frame after a trap. STOP halts successfully with the gas
    /// allowance intact; every other trap burns the remaining gas and clears
    /// the return buffer.
    fn apply_trap(&mut self, trap: Trap, pc: usize, opcode: u8) {
        trace!("{}", describe_location(trap, pc, opcode));

        if trap.is_stop() {
            self.exit(HaltReason::Stop, Vec::new());
        } else {
            self.gas_used = self.gas_used.saturating_add(self.gas_remaining);
            self.gas_remaining = 0;
            self.returndata.clear();
            self.exit(HaltReason::Trapped(trap), Vec::new());
        }
    }

    /// Executes the next instruction and returns a snapshot of the frame
    /// after it. A halted frame is left untouched.
    pub fn step(&mut self, env: &mut dyn Environment) -> State {
        let pc = self.pc;
        let opcode = self.bytecode.get(pc).copied().unwrap_or(opcodes::STOP);

        #[cfg(feature = "step-tracing")]
        trace!(
            pc,
            opcode = opcodes::opcode_name(opcode),
            stack = %self.stack,
            gas = self.gas_remaining,
            "executing opcode"
        );

        if self.halt.is_none() {
            if let Err(trap) = self.dispatch(env) {
                self.apply_trap(trap, pc, opcode);
            }
        }

        State {
            pc,
            opcode,
            gas_used: self.gas_used,
            gas_remaining: self.gas_remaining,
            stack: self.stack.clone(),
            memory_words: self.memory.word_count(),
        }
    }

    /// Runs the frame to completion and returns the result the caller
    /// frame observes.
    pub fn execute(&mut self, env: &mut dyn Environment) -> ExecutionResult {
        while self.halt.is_none() {
            self.step(env);
        }

        let halt = self.halt.clone().expect("impossible case: loop exits only when halted");
        ExecutionResult {
            return_code: if halt.is_success() { 1 } else { 0 },
            output: self.output.clone(),
            gas_used: self.gas_used,
            gas_remaining: self.gas_remaining,
            halt,
            counters: self.counters.clone(),
        }
    }
}
