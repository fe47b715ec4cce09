/// Gas prices consulted by the opcode handlers.
///
/// Defaults follow the EIP-2929/EIP-3529 mainnet schedule plus the
/// precompile prices the batch gas accountant reads through
/// [`ChainSpec::param`].
#[derive(Clone, Debug)]
pub struct GasSchedule {
    /// Per-byte cost of the EXP exponent.
    pub exp_byte: u64,
    /// Per-word cost of SHA3 input.
    pub keccak_word: u64,
    /// Base cost of the SHA-256 precompile.
    pub sha256: u64,
    /// Per-word cost of SHA-256 precompile input.
    pub sha256_word: u64,
    /// Cost of the P-256 signature verification precompile.
    pub p256_verify: u64,
    /// Per-word cost of the copy opcodes.
    pub copy_word: u64,
    /// First touch of an account in a frame.
    pub cold_account_access: u64,
    /// Any later touch of an account or storage key.
    pub warm_access: u64,
    /// First touch of a storage key in a frame.
    pub cold_sload: u64,
    /// SSTORE writing a nonzero value over zero.
    pub sstore_set: u64,
    /// Any other SSTORE.
    pub sstore_reset: u64,
    /// Surcharge for a value-carrying CALL.
    pub call_value_transfer: u64,
    /// Per-topic cost of LOG.
    pub log_topic: u64,
    /// Per-byte cost of LOG data.
    pub log_data_byte: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        GasSchedule {
            exp_byte: 50,
            keccak_word: 6,
            sha256: 60,
            sha256_word: 12,
            p256_verify: 3450,
            copy_word: 3,
            cold_account_access: 2600,
            warm_access: 100,
            cold_sload: 2100,
            sstore_set: 20000,
            sstore_reset: 2900,
            call_value_transfer: 9000,
            log_topic: 375,
            log_data_byte: 8,
        }
    }
}

/// Chain-level parameters threaded into every frame.
#[derive(Clone, Debug)]
pub struct ChainSpec {
    /// Chain identifier pushed by CHAINID.
    pub chain_id: u64,
    /// Gas schedule for dynamic opcode costs.
    pub gas: GasSchedule,
}

impl Default for ChainSpec {
    fn default() -> Self {
        ChainSpec { chain_id: 1101, gas: GasSchedule::default() }
    }
}

impl ChainSpec {
    /// Looks up a parameter by group and name, the key-path surface exposed
    /// to collaborators that configure from chain files.
    pub fn param(&self, group: &str, name: &str) -> Option<u64> {
        match (group, name) {
            ("chain", "chainId") => Some(self.chain_id),
            ("gasPrices", "expByte") => Some(self.gas.exp_byte),
            ("gasPrices", "keccakWord") => Some(self.gas.keccak_word),
            ("gasPrices", "sha256") => Some(self.gas.sha256),
            ("gasPrices", "sha256Word") => Some(self.gas.sha256_word),
            ("gasPrices", "p256verify") => Some(self.gas.p256_verify),
            ("gasPrices", "copyWord") => Some(self.gas.copy_word),
            ("gasPrices", "coldAccountAccess") => Some(self.gas.cold_account_access),
            ("gasPrices", "warmAccess") => Some(self.gas.warm_access),
            ("gasPrices", "coldSload") => Some(self.gas.cold_sload),
            ("gasPrices", "sstoreSet") => Some(self.gas.sstore_set),
            ("gasPrices", "sstoreReset") => Some(self.gas.sstore_reset),
            ("gasPrices", "callValueTransfer") => Some(self.gas.call_value_transfer),
            ("gasPrices", "logTopic") => Some(self.gas.log_topic),
            ("gasPrices", "logDataByte") => Some(self.gas.log_data_byte),
            _ => None,
        }
    }
}
