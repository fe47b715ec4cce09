use std::sync::{Arc, Mutex};

use alloy::primitives::{keccak256, B256};
use hashbrown::HashMap;
use once_cell::sync::Lazy;

use super::opcodes;

/// Cache of analyzed code buffers keyed by code hash, so frames executing
/// the same bytecode share one analysis.
static ANALYSIS_CACHE: Lazy<Mutex<HashMap<B256, Arc<JumpMap>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Valid-destination bitmaps for one code buffer.
///
/// Bit `i` of the JUMPDEST map is set iff `code[i]` is a JUMPDEST byte that
/// is not part of a PUSH immediate; the BEGINSUB map is the same for
/// subroutine entry points. JUMP/JUMPI/JUMPSUB validate their targets
/// against these maps.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct JumpMap {
    jumpdest: Vec<u64>,
    beginsub: Vec<u64>,
    code_len: usize,
}

impl JumpMap {
    /// Scans a code buffer, marking every JUMPDEST and BEGINSUB byte outside
    /// PUSH immediates.
    ///
    /// ```
    /// use zkevm_vm::core::jumpmap::JumpMap;
    ///
    /// // PUSH1 0x5b; JUMPDEST
    /// let map = JumpMap::analyze(&[0x60, 0x5b, 0x5b]);
    /// assert!(!map.is_jumpdest(1)); // inside the PUSH immediate
    /// assert!(map.is_jumpdest(2));
    /// ```
    pub fn analyze(code: &[u8]) -> JumpMap {
        let words = code.len().div_ceil(64);
        let mut jumpdest = vec![0u64; words];
        let mut beginsub = vec![0u64; words];

        let mut i = 0;
        while i < code.len() {
            match code[i] {
                opcodes::JUMPDEST => jumpdest[i / 64] |= 1 << (i % 64),
                opcodes::BEGINSUB => beginsub[i / 64] |= 1 << (i % 64),
                push @ opcodes::PUSH1..=opcodes::PUSH32 => {
                    i += (push - opcodes::PUSH1 + 1) as usize;
                }
                _ => {}
            }
            i += 1;
        }

        JumpMap { jumpdest, beginsub, code_len: code.len() }
    }

    /// Returns the shared analysis for `code`, computing and caching it on
    /// first use.
    pub fn shared(code: &[u8]) -> Arc<JumpMap> {
        let hash = keccak256(code);
        let mut cache = ANALYSIS_CACHE.lock().expect("analysis cache poisoned");
        cache.entry(hash).or_insert_with(|| Arc::new(JumpMap::analyze(code))).clone()
    }

    /// Whether byte `i` is a valid JUMP/JUMPI destination.
    pub fn is_jumpdest(&self, i: usize) -> bool {
        i < self.code_len && self.jumpdest[i / 64] & (1 << (i % 64)) != 0
    }

    /// Whether byte `i` is a valid JUMPSUB destination.
    pub fn is_beginsub(&self, i: usize) -> bool {
        i < self.code_len && self.beginsub[i / 64] & (1 << (i % 64)) != 0
    }
}
