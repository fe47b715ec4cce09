//! End-to-end interpreter scenarios over a scripted mock environment.

use std::collections::HashMap;

use alloy::primitives::{Address, B256, U256};
use zkevm_common::utils::strings::decode_hex;
use zkevm_vm::core::{
    chainspec::ChainSpec,
    codehash,
    counters::Counter,
    env::{CallOutcome, Environment},
    log::Log,
    trap::Trap,
    vm::{ExecutionResult, FrameEnv, HaltReason, VM},
};

/// An in-memory world for driving frames: map-backed storage and code,
/// scripted sub-call outcomes, and recorded side effects.
#[derive(Default)]
struct MockEnvironment {
    storage: HashMap<B256, Vec<u8>>,
    code: HashMap<Address, Vec<u8>>,
    balances: HashMap<Address, U256>,
    logs: Vec<Log>,
    finished: Option<Vec<u8>>,
    reverted: Option<Vec<u8>>,
    destructed: Option<Address>,
    outcomes: Vec<CallOutcome>,
    sub_calls: usize,
}

impl MockEnvironment {
    fn next_outcome(&mut self) -> CallOutcome {
        self.sub_calls += 1;
        if self.outcomes.is_empty() {
            CallOutcome { return_code: 1, returndata: Vec::new(), gas_used: 0 }
        } else {
            self.outcomes.remove(0)
        }
    }
}

impl Environment for MockEnvironment {
    fn block_coinbase(&self) -> Address {
        Address::repeat_byte(0xc0)
    }

    fn block_timestamp(&self) -> u64 {
        1_700_000_000
    }

    fn block_difficulty(&self) -> U256 {
        U256::ZERO
    }

    fn block_gas_limit(&self) -> u64 {
        30_000_000
    }

    fn block_base_fee(&self) -> U256 {
        U256::from(7)
    }

    fn block_number(&mut self) -> u64 {
        1234
    }

    fn batch_hash(&mut self, number: u64) -> B256 {
        B256::with_last_byte(number as u8)
    }

    fn self_balance(&mut self) -> U256 {
        U256::from(1_000_000)
    }

    fn external_balance(&mut self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }

    fn external_code(&mut self, address: Address) -> Vec<u8> {
        self.code.get(&address).cloned().unwrap_or_default()
    }

    fn external_code_size(&mut self, address: Address) -> usize {
        self.code.get(&address).map(|code| code.len()).unwrap_or(0)
    }

    fn storage_load(&mut self, key: B256) -> Vec<u8> {
        self.storage.get(&key).cloned().unwrap_or_default()
    }

    fn storage_store(&mut self, key: B256, value: Vec<u8>) {
        self.storage.insert(key, value);
    }

    fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn finish(&mut self, data: Vec<u8>) {
        self.finished = Some(data);
    }

    fn revert(&mut self, data: Vec<u8>) {
        self.reverted = Some(data);
    }

    fn self_destruct(&mut self, beneficiary: Address) {
        self.destructed = Some(beneficiary);
    }

    fn create(&mut self, _gas: u128, _value: U256, _init_code: Vec<u8>) -> CallOutcome {
        self.next_outcome()
    }

    fn create2(
        &mut self,
        _gas: u128,
        _value: U256,
        _init_code: Vec<u8>,
        _salt: B256,
    ) -> CallOutcome {
        self.next_outcome()
    }

    fn call(&mut self, _gas: u128, _to: Address, _value: U256, _data: Vec<u8>) -> CallOutcome {
        self.next_outcome()
    }

    fn call_code(&mut self, _gas: u128, _to: Address, _value: U256, _data: Vec<u8>) -> CallOutcome {
        self.next_outcome()
    }

    fn call_delegate(&mut self, _gas: u128, _to: Address, _data: Vec<u8>) -> CallOutcome {
        self.next_outcome()
    }

    fn call_static(&mut self, _gas: u128, _to: Address, _data: Vec<u8>) -> CallOutcome {
        self.next_outcome()
    }
}

const GAS_LIMIT: u128 = 1_000_000;

fn run_with(
    code_hex: &str,
    frame: FrameEnv,
    mut mock: MockEnvironment,
) -> (VM, ExecutionResult, MockEnvironment) {
    let code = decode_hex(code_hex).expect("invalid test bytecode");
    let mut vm = VM::new(&code, frame, ChainSpec::default(), GAS_LIMIT);
    let result = vm.execute(&mut mock);
    (vm, result, mock)
}

fn run(code_hex: &str) -> (VM, ExecutionResult, MockEnvironment) {
    run_with(code_hex, FrameEnv::default(), MockEnvironment::default())
}

fn word(hex: &str) -> U256 {
    U256::from_be_slice(&decode_hex(hex).expect("invalid test word"))
}

#[test]
fn test_add_wraparound() {
    // PUSH32 2^256-1; PUSH1 1; ADD; STOP
    let code = format!("7f{}60010100", "ff".repeat(32));
    let (vm, result, _) = run(&code);

    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.return_code, 1);
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
    assert_eq!(result.counters.get(Counter::OpPush), 2);
    assert_eq!(result.counters.get(Counter::OpAdd), 1);
}

#[test]
fn test_div_by_zero() {
    // DIV(7, 0): PUSH1 7; PUSH1 0; SWAP1; DIV; STOP puts the dividend on top
    let (vm, _, _) = run("60076000900400");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));

    // MOD(7, 0), SDIV(7, 0), SMOD(7, 0)
    let (vm, _, _) = run("60076000900600");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));

    let (vm, _, _) = run("60076000900500");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));

    let (vm, _, _) = run("60076000900700");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_sdiv_min_by_minus_one() {
    // PUSH32 -1; PUSH32 MIN_I256; SDIV; STOP
    let min = format!("80{}", "00".repeat(31));
    let code = format!("7f{}7f{}0500", "ff".repeat(32), min);
    let (vm, _, _) = run(&code);
    assert_eq!(vm.stack.top(), Some(word(&min)));
}

#[test]
fn test_smod_keeps_dividend_sign() {
    // -7 mod 3 = -1: PUSH1 3; PUSH32 -7; SMOD; STOP
    let minus_seven = format!("{}f9", "ff".repeat(31));
    let code = format!("60037f{}0700", minus_seven);
    let (vm, _, _) = run(&code);
    assert_eq!(vm.stack.top(), Some(U256::MAX));
}

#[test]
fn test_mul_identities() {
    // MUL(5, 1) = 5
    let (vm, _, _) = run("600560010200");
    assert_eq!(vm.stack.top(), Some(U256::from(5)));

    // MUL(5, 0) = 0
    let (vm, _, _) = run("600560000200");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_signextend_boundaries() {
    // k=0, v=0xff -> sign bit set, extends to 2^256-1
    let (vm, _, _) = run("60ff60000b00");
    assert_eq!(vm.stack.top(), Some(U256::MAX));

    // k=0, v=0x7f -> sign bit clear, passes through
    let (vm, _, _) = run("607f60000b00");
    assert_eq!(vm.stack.top(), Some(U256::from(0x7f)));

    // k=31 -> identity for any word
    let value = format!("80{}ff", "11".repeat(30));
    let code = format!("7f{}601f0b00", value);
    let (vm, _, _) = run(&code);
    assert_eq!(vm.stack.top(), Some(word(&value)));
}

#[test]
fn test_signextend_idempotent() {
    // SIGNEXTEND(0, SIGNEXTEND(0, 0xff)) = SIGNEXTEND(0, 0xff)
    let (vm, _, _) = run("60ff60000b60000b00");
    assert_eq!(vm.stack.top(), Some(U256::MAX));
}

#[test]
fn test_sar_with_sign() {
    // SAR(1, 0x80..00) = 0xc0..00
    let value = format!("80{}", "00".repeat(31));
    let code = format!("7f{}60011d00", value);
    let (vm, _, _) = run(&code);
    assert_eq!(vm.stack.top(), Some(word(&format!("c0{}", "00".repeat(31)))));

    // SAR(256, 0x80..00) = all ones
    let code = format!("7f{}6101001d00", value);
    let (vm, _, _) = run(&code);
    assert_eq!(vm.stack.top(), Some(U256::MAX));

    // SAR(256, 1) = 0
    let (vm, _, _) = run("60016101001d00");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_shl_matches_multiplication() {
    // SHL(4, 3) = 3 * 2^4 = 48
    let (vm, _, _) = run("600360041b00");
    assert_eq!(vm.stack.top(), Some(U256::from(48)));

    // SHL(256, x) = 0
    let (vm, _, _) = run("60036101001b00");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_byte_positions() {
    // BYTE(31, 0xaabb) = 0xbb
    let (vm, _, _) = run("61aabb601f1a00");
    assert_eq!(vm.stack.top(), Some(U256::from(0xbb)));

    // BYTE(30, 0xaabb) = 0xaa
    let (vm, _, _) = run("61aabb601e1a00");
    assert_eq!(vm.stack.top(), Some(U256::from(0xaa)));

    // BYTE(32, x) = 0
    let (vm, _, _) = run("61aabb60201a00");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_exp_wraps_and_counts_exponent_bytes() {
    // EXP(2, 256) = 0 under mod 2^256; exponent is two bytes wide
    let (vm, result, _) = run("61010060020a00");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
    assert_eq!(result.counters.get(Counter::OpExp), 1);
    assert_eq!(result.counters.get(Counter::ExpBytes), 2);
}

#[test]
fn test_exp_zero_exponent_still_recorded() {
    // EXP(5, 0) = 1, and the counter fires before the short-circuit
    let (vm, result, _) = run("600060050a00");
    assert_eq!(vm.stack.top(), Some(U256::from(1)));
    assert_eq!(result.counters.get(Counter::OpExp), 1);
    assert_eq!(result.counters.get(Counter::ExpBytes), 0);
}

#[test]
fn test_push_advances_pc_by_width_plus_one() {
    let code = decode_hex("62aabbcc00").expect("invalid test bytecode");
    let mut vm = VM::new(&code, FrameEnv::default(), ChainSpec::default(), GAS_LIMIT);
    let mut mock = MockEnvironment::default();

    let state = vm.step(&mut mock);
    assert_eq!(state.pc, 0);
    assert_eq!(vm.pc, 4);
    assert_eq!(vm.stack.top(), Some(U256::from(0x00aabbcc)));
}

#[test]
fn test_push_immediate_truncated_by_code_end() {
    // PUSH32 with only one immediate byte: missing bytes read as zero
    let (vm, result, _) = run("7fff");
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(vm.stack.top(), Some(word(&format!("ff{}", "00".repeat(31)))));
}

#[test]
fn test_dup_preserves_depth_plus_one() {
    // PUSH1 1; PUSH1 2; PUSH1 3; DUP2; STOP
    let (vm, _, _) = run("6001600260038100");
    assert_eq!(vm.stack.size(), 4);
    assert_eq!(vm.stack.top(), Some(U256::from(2)));
    assert_eq!(vm.stack.peek(1), Some(U256::from(3)));
}

#[test]
fn test_swap_exchanges_top_with_nth() {
    // PUSH1 1; PUSH1 2; PUSH1 3; SWAP2; STOP
    let (vm, _, _) = run("6001600260039100");
    assert_eq!(vm.stack.size(), 3);
    assert_eq!(vm.stack.top(), Some(U256::from(1)));
    assert_eq!(vm.stack.peek(2), Some(U256::from(3)));
}

#[test]
fn test_jump_to_non_jumpdest_traps() {
    // PUSH1 3; JUMP; STOP -- position 3 is the STOP byte, not a JUMPDEST
    let (_, result, _) = run("60035600");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidJump));
    assert_eq!(result.return_code, 0);
    assert_eq!(result.gas_remaining, 0);
}

#[test]
fn test_jump_to_jumpdest_succeeds() {
    // PUSH1 3; JUMP; JUMPDEST; STOP
    let (_, result, _) = run("6003565b00");
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.return_code, 1);
    assert_eq!(result.counters.get(Counter::OpJumpDest), 1);
}

#[test]
fn test_jump_into_push_immediate_traps() {
    // PUSH1 4; JUMP; PUSH2 0x5b5b; STOP -- position 4 is a 0x5b byte, but it
    // sits inside the PUSH2 immediate
    let (_, result, _) = run("600456615b5b00");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidJump));

    // the same shape with a genuine JUMPDEST after the immediate succeeds
    let (_, result, _) = run("600656615b5b5b00");
    assert_eq!(result.halt, HaltReason::Stop);
}

#[test]
fn test_jumpi_conditional() {
    // cond 0: PUSH1 0; PUSH1 6; JUMPI; STOP; JUMPDEST; STOP -- falls through
    let (_, result, _) = run("6000600657005b00");
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.counters.get(Counter::OpJumpDest), 0);

    // cond 1 jumps over the first STOP
    let (_, result, _) = run("6001600657005b00");
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.counters.get(Counter::OpJumpDest), 1);
}

#[test]
fn test_jumpsub_returnsub_round_trip() {
    // PUSH1 4; JUMPSUB; STOP; BEGINSUB; RETURNSUB
    let (_, result, _) = run("60045e005c5d");
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.return_code, 1);
    assert_eq!(result.counters.get(Counter::OpJumpSub), 1);
    assert_eq!(result.counters.get(Counter::OpReturnSub), 1);
}

#[test]
fn test_jumpsub_to_non_beginsub_traps() {
    let (_, result, _) = run("60035e00");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidJumpSub));
}

#[test]
fn test_beginsub_fall_through_traps() {
    let (_, result, _) = run("5c00");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidBeginSub));
}

#[test]
fn test_returnsub_on_empty_substack_traps() {
    let (_, result, _) = run("5d");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidReturnSub));
}

#[test]
fn test_static_sstore_traps() {
    let frame = FrameEnv { is_static: true, ..Default::default() };
    let (_, result, mock) = run_with("600160005500", frame, MockEnvironment::default());
    assert_eq!(result.halt, HaltReason::Trapped(Trap::StaticStateChange));
    assert_eq!(result.return_code, 0);
    assert!(mock.storage.is_empty());
}

#[test]
fn test_static_log_and_selfdestruct_trap() {
    let frame = FrameEnv { is_static: true, ..Default::default() };
    let (_, result, _) = run_with("60006000a0", frame, MockEnvironment::default());
    assert_eq!(result.halt, HaltReason::Trapped(Trap::StaticStateChange));

    let frame = FrameEnv { is_static: true, ..Default::default() };
    let (_, result, _) = run_with("6000ff", frame, MockEnvironment::default());
    assert_eq!(result.halt, HaltReason::Trapped(Trap::StaticStateChange));
}

#[test]
fn test_static_call_with_value_traps() {
    // PUSH1 0 x2 (out), x2 (in), PUSH1 1 (value), PUSH20 to, PUSH2 gas, CALL
    let code = format!("6000600060006000600173{}61fffff100", "aa".repeat(20));
    let frame = FrameEnv { is_static: true, ..Default::default() };
    let (_, result, _) = run_with(&code, frame, MockEnvironment::default());
    assert_eq!(result.halt, HaltReason::Trapped(Trap::StaticStateChange));
}

#[test]
fn test_sstore_shortest_form() {
    // storing 1 writes the single byte 0x01
    let (_, _, mock) = run("600160005500");
    assert_eq!(mock.storage.get(&B256::ZERO), Some(&vec![0x01]));

    // storing 0 writes the empty byte string
    let (_, _, mock) = run("600060005500");
    assert_eq!(mock.storage.get(&B256::ZERO), Some(&Vec::new()));
}

#[test]
fn test_sload_empty_reads_zero() {
    // PUSH1 9; SLOAD; STOP
    let (vm, _, _) = run("60095400");
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_sload_round_trip() {
    // PUSH2 0x0100; PUSH1 7; SSTORE; PUSH1 7; SLOAD; STOP
    let (vm, _, mock) = run("61010060075560075400");
    let key = B256::from(U256::from(7));
    assert_eq!(mock.storage.get(&key), Some(&vec![0x01, 0x00]));
    assert_eq!(vm.stack.top(), Some(U256::from(0x0100)));
}

#[test]
fn test_extcodehash_empty_account_is_zero() {
    let code = format!("73{}3f00", "11".repeat(20));
    let (vm, _, _) = run(&code);
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
}

#[test]
fn test_extcodehash_uses_linear_poseidon() {
    let target = Address::repeat_byte(0x22);
    let contract = decode_hex("6001600101").expect("invalid test bytecode");
    let mut mock = MockEnvironment::default();
    mock.code.insert(target, contract.clone());

    let code = format!("73{}3f00", "22".repeat(20));
    let (vm, _, _) = run_with(&code, FrameEnv::default(), mock);

    let expected = U256::from_be_bytes(codehash::hash_bytecode(&contract).0);
    assert_eq!(vm.stack.top(), Some(expected));
}

#[test]
fn test_calldataload_at_end_of_data() {
    let frame = FrameEnv { calldata: vec![1, 2, 3, 4], ..Default::default() };
    // offset equal to the call-data size reads zero
    let (vm, _, _) = run_with("60043500", frame, MockEnvironment::default());
    assert_eq!(vm.stack.top(), Some(U256::ZERO));

    let frame = FrameEnv { calldata: vec![1, 2, 3, 4], ..Default::default() };
    let (vm, _, _) = run_with("60003500", frame, MockEnvironment::default());
    let mut padded = vec![1, 2, 3, 4];
    padded.resize(32, 0);
    assert_eq!(vm.stack.top(), Some(U256::from_be_slice(&padded)));
}

#[test]
fn test_call_writes_return_data_and_status() {
    let mut mock = MockEnvironment::default();
    mock.outcomes.push(CallOutcome {
        return_code: 1,
        returndata: vec![0xaa, 0xbb],
        gas_used: 100,
    });

    // PUSH1 2 (outLen); PUSH1 0 (outOff); PUSH1 0 (inLen); PUSH1 0 (inOff);
    // PUSH1 0 (value); PUSH20 to; PUSH2 gas; CALL; RETURNDATASIZE; STOP
    let code = format!("6002600060006000600073{}61fffff13d00", "aa".repeat(20));
    let (vm, result, mock) = run_with(&code, FrameEnv::default(), mock);

    assert_eq!(result.halt, HaltReason::Stop);
    // return data size on top, status word below it
    assert_eq!(vm.stack.top(), Some(U256::from(2)));
    assert_eq!(vm.stack.peek(1), Some(U256::from(1)));
    assert_eq!(vm.memory.read(0, 2), vec![0xaa, 0xbb]);
    assert_eq!(mock.sub_calls, 1);
    assert_eq!(result.counters.get(Counter::OpCall), 1);
    assert_eq!(result.counters.get(Counter::ProcessContractCall), 1);
}

#[test]
fn test_sub_call_failure_is_status_zero_not_trap() {
    let mut mock = MockEnvironment::default();
    mock.outcomes.push(CallOutcome {
        return_code: 0,
        returndata: vec![0xde, 0xad],
        gas_used: 50,
    });

    let code = format!("6002600060006000600073{}61fffff100", "aa".repeat(20));
    let (vm, result, _) = run_with(&code, FrameEnv::default(), mock);

    // the parent resumes and halts normally with a zero status word
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.return_code, 1);
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
    // the failed sub-call's payload stays readable
    assert_eq!(vm.returndata, vec![0xde, 0xad]);
}

#[test]
fn test_call_output_truncated_to_out_region() {
    let mut mock = MockEnvironment::default();
    mock.outcomes.push(CallOutcome {
        return_code: 1,
        returndata: vec![0x11, 0x22, 0x33, 0x44],
        gas_used: 0,
    });

    // out region is only 2 bytes
    let code = format!("6002600060006000600073{}61fffff100", "aa".repeat(20));
    let (vm, _, _) = run_with(&code, FrameEnv::default(), mock);

    assert_eq!(vm.memory.read(0, 4), vec![0x11, 0x22, 0x00, 0x00]);
    assert_eq!(vm.returndata.len(), 4);
}

#[test]
fn test_create_pushes_address_on_success() {
    let created = Address::repeat_byte(0x77);
    let mut mock = MockEnvironment::default();
    mock.outcomes.push(CallOutcome {
        return_code: 1,
        returndata: created.to_vec(),
        gas_used: 1000,
    });

    // PUSH1 0 (len); PUSH1 0 (offset); PUSH1 0 (value); CREATE; STOP
    let (vm, result, _) = run_with("600060006000f000", FrameEnv::default(), mock);

    let mut expected = [0u8; 32];
    expected[12..].copy_from_slice(created.as_ref());
    assert_eq!(vm.stack.top(), Some(U256::from_be_bytes(expected)));
    assert_eq!(result.counters.get(Counter::OpCreate), 1);
    assert_eq!(result.counters.get(Counter::ProcessContractCall), 1);
}

#[test]
fn test_create_pushes_zero_on_failure() {
    let mut mock = MockEnvironment::default();
    mock.outcomes.push(CallOutcome {
        return_code: 0,
        returndata: vec![0x08, 0xc3, 0x79, 0xa0],
        gas_used: 1000,
    });

    let (vm, _, _) = run_with("600060006000f000", FrameEnv::default(), mock);
    assert_eq!(vm.stack.top(), Some(U256::ZERO));
    // a failed creation leaves its revert payload in the return buffer
    assert_eq!(vm.returndata, vec![0x08, 0xc3, 0x79, 0xa0]);
}

#[test]
fn test_return_hands_output_to_environment() {
    // PUSH1 0xaa; PUSH1 0; MSTORE8; PUSH1 1; PUSH1 0; RETURN
    let (_, result, mock) = run("60aa60005360016000f3");
    assert_eq!(result.halt, HaltReason::Return);
    assert_eq!(result.return_code, 1);
    assert_eq!(result.output, vec![0xaa]);
    assert_eq!(mock.finished, Some(vec![0xaa]));
}

#[test]
fn test_revert_preserves_output_and_gas() {
    let (_, result, mock) = run("60aa60005360016000fd");
    assert_eq!(result.halt, HaltReason::Revert);
    assert_eq!(result.return_code, 0);
    assert_eq!(result.output, vec![0xaa]);
    assert_eq!(mock.reverted, Some(vec![0xaa]));
    assert!(result.gas_remaining > 0);
}

#[test]
fn test_selfdestruct_queues_beneficiary() {
    let code = format!("73{}ff", "bb".repeat(20));
    let (_, result, mock) = run(&code);
    assert_eq!(result.halt, HaltReason::SelfDestruct);
    assert_eq!(result.return_code, 1);
    assert_eq!(mock.destructed, Some(Address::repeat_byte(0xbb)));
}

#[test]
fn test_stack_overflow_traps() {
    let code = "6001".repeat(1025);
    let (vm, result, _) = run(&code);
    assert_eq!(result.halt, HaltReason::Trapped(Trap::StackOverflow));
    // the failed push mutated nothing
    assert_eq!(vm.stack.size(), 1024);
}

#[test]
fn test_stack_underflow_traps() {
    let (_, result, _) = run("01");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::StackUnderflow));
    assert_eq!(result.return_code, 0);
}

#[test]
fn test_invalid_opcode_traps() {
    let (_, result, _) = run("0c");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidOpcode));

    let (_, result, _) = run("fe");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidOpcode));
}

#[test]
fn test_out_of_gas_consumes_everything() {
    let code = decode_hex("6001600101").expect("invalid test bytecode");
    let mut vm = VM::new(&code, FrameEnv::default(), ChainSpec::default(), 4);
    let mut mock = MockEnvironment::default();
    let result = vm.execute(&mut mock);

    assert_eq!(result.halt, HaltReason::Trapped(Trap::OutOfGas));
    assert_eq!(result.gas_remaining, 0);
    assert_eq!(result.gas_used, 4);
    assert_eq!(result.return_code, 0);
}

#[test]
fn test_implicit_stop_past_end_of_code() {
    let (_, result, _) = run("6001");
    assert_eq!(result.halt, HaltReason::Stop);
    assert_eq!(result.return_code, 1);
}

#[test]
fn test_msize_tracks_high_water_mark() {
    // MSIZE; PUSH1 0; MLOAD; POP; MSIZE; STOP
    let (vm, _, _) = run("59600051505900");
    assert_eq!(vm.stack.top(), Some(U256::from(32)));
    assert_eq!(vm.stack.peek(1), Some(U256::ZERO));
    assert_eq!(vm.memory.word_count(), 1);
}

#[test]
fn test_log_reaches_environment() {
    // PUSH1 0xaa; PUSH1 0; MSTORE8; PUSH1 topic; PUSH1 1; PUSH1 0; LOG1
    let (_, result, mock) = run("60aa600053604260016000a100");
    assert_eq!(mock.logs.len(), 1);
    assert_eq!(mock.logs[0].topics, vec![U256::from(0x42)]);
    assert_eq!(mock.logs[0].data, vec![0xaa]);
    assert_eq!(result.counters.get(Counter::OpLog), 1);
}

#[test]
fn test_balance_reads_environment() {
    let holder = Address::repeat_byte(0x33);
    let mut mock = MockEnvironment::default();
    mock.balances.insert(holder, U256::from(42_000));

    let code = format!("73{}3100", "33".repeat(20));
    let (vm, _, _) = run_with(&code, FrameEnv::default(), mock);
    assert_eq!(vm.stack.top(), Some(U256::from(42_000)));
}

#[test]
fn test_blockhash_uses_batch_hash() {
    let (vm, _, _) = run("60054000");
    assert_eq!(vm.stack.top(), Some(U256::from(5)));
}

#[test]
fn test_chainid_from_spec() {
    let (vm, _, _) = run("4600");
    assert_eq!(vm.stack.top(), Some(U256::from(1101)));
}

#[test]
fn test_gas_opcode_reports_remaining() {
    let code = decode_hex("5a00").expect("invalid test bytecode");
    let mut vm = VM::new(&code, FrameEnv::default(), ChainSpec::default(), 1000);
    let mut mock = MockEnvironment::default();
    vm.execute(&mut mock);
    assert_eq!(vm.stack.top(), Some(U256::from(998)));
}

#[test]
fn test_counters_tagged_with_frame_classification() {
    let frame = FrameEnv { is_create: true, is_deploy: true, ..Default::default() };
    let (_, result, _) = run_with("600100", frame, MockEnvironment::default());
    assert!(result.counters.is_create());
    assert!(result.counters.is_deploy());

    let (_, result, _) = run("600100");
    assert!(!result.counters.is_create());
    assert!(!result.counters.is_deploy());
}

#[test]
fn test_trap_clears_return_buffer() {
    let mut mock = MockEnvironment::default();
    mock.outcomes.push(CallOutcome {
        return_code: 1,
        returndata: vec![0x01, 0x02],
        gas_used: 0,
    });

    // a successful CALL fills the return buffer, then an invalid jump traps
    let code = format!("6002600060006000600073{}61fffff1600f56", "aa".repeat(20));
    let (vm, result, _) = run_with(&code, FrameEnv::default(), mock);
    assert_eq!(result.halt, HaltReason::Trapped(Trap::InvalidJump));
    assert!(vm.returndata.is_empty());
}

#[test]
fn test_returndatacopy_past_buffer_traps() {
    // empty return buffer, copy of one byte must trap
    let (_, result, _) = run("6001600060003e00");
    assert_eq!(result.halt, HaltReason::Trapped(Trap::OutOfRange));
}
