//! Virtual counter accumulation feeding the proving-cost model.
//!
//! Every executed opcode contributes deterministic increments to a small set
//! of named counters; the prover consumes the totals to bound proving cost.
//! The accumulator is write-mostly, so it is a fixed-size array indexed by
//! [`Counter`] rather than a string-keyed map. Labels match the cost model's
//! wire names (family-shared and derived counters carry an underscore
//! prefix).

macro_rules! counters {
    ($($variant:ident => $label:literal),+ $(,)?) => {
        /// A named counter in the proving-cost accumulator.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(usize)]
        pub enum Counter {
            $(
                #[doc = concat!("The `", $label, "` counter.")]
                $variant,
            )+
        }

        impl Counter {
            /// Number of distinct counters.
            pub const COUNT: usize = [$(Counter::$variant),+].len();

            /// Every counter, in index order.
            pub const ALL: [Counter; Self::COUNT] = [$(Counter::$variant),+];

            /// The cost model's wire name for this counter.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Counter::$variant => $label),+
                }
            }
        }
    };
}

counters! {
    OpAdd => "opAdd",
    OpMul => "opMul",
    OpSub => "opSub",
    OpDiv => "opDiv",
    OpSdiv => "opSdiv",
    OpMod => "opMod",
    OpSmod => "opSmod",
    OpAddMod => "opAddMod",
    OpMulMod => "opMulMod",
    OpExp => "opExp",
    OpSignExtend => "opSignExtend",
    OpLt => "opLt",
    OpGt => "opGt",
    OpSlt => "opSlt",
    OpSgt => "opSgt",
    OpEq => "opEq",
    OpIsZero => "opIsZero",
    OpAnd => "opAnd",
    OpOr => "opOr",
    OpXor => "opXor",
    OpNot => "opNot",
    OpByte => "opByte",
    OpShl => "opShl",
    OpShr => "opShr",
    OpSar => "opSar",
    OpSha3 => "opSha3",
    OpAddress => "opAddress",
    OpBalance => "opBalance",
    OpOrigin => "opOrigin",
    OpCaller => "opCaller",
    OpCallValue => "opCallValue",
    OpCallDataLoad => "opCallDataLoad",
    OpCallDataSize => "opCallDataSize",
    OpCallDataCopy => "opCallDataCopy",
    OpCodeSize => "opCodeSize",
    OpCodeCopy => "opCodeCopy",
    OpGasPrice => "opGasPrice",
    OpExtCodeSize => "opExtCodeSize",
    OpExtCodeCopy => "opExtCodeCopy",
    OpReturnDataSize => "opReturnDataSize",
    OpReturnDataCopy => "opReturnDataCopy",
    OpExtCodeHash => "opExtCodeHash",
    OpBlockHash => "opBlockHash",
    OpCoinbase => "opCoinbase",
    OpTimestamp => "opTimestamp",
    OpNumber => "opNumber",
    OpDifficulty => "opDifficulty",
    OpGasLimit => "opGasLimit",
    OpChainId => "opChainId",
    OpSelfBalance => "opSelfBalance",
    OpBaseFee => "opBaseFee",
    OpPop => "opPop",
    OpMload => "opMload",
    OpMstore => "opMstore",
    OpMstore8 => "opMstore8",
    OpSload => "opSload",
    OpSstore => "opSstore",
    OpJump => "opJump",
    OpJumpi => "opJumpi",
    OpPc => "opPc",
    OpMsize => "opMsize",
    OpGas => "opGas",
    OpJumpDest => "opJumpDest",
    OpJumpSub => "opJumpSub",
    OpReturnSub => "opReturnSub",
    OpPush => "_opPush",
    OpDup => "_opDup",
    OpSwap => "_opSwap",
    OpLog => "_opLog",
    OpCreate => "opCreate",
    OpCreate2 => "opCreate2",
    OpCall => "opCall",
    OpCallCode => "opCallCode",
    OpDelegateCall => "opDelegateCall",
    OpStaticCall => "opStaticCall",
    OpStop => "opStop",
    OpReturn => "opReturn",
    OpRevert => "opRevert",
    OpSelfDestruct => "opSelfDestruct",
    ProcessContractCall => "_processContractCall",
    PushBytes => "_pushBytes",
    ExpBytes => "_expBytes",
    InputBytes => "_inputBytes",
    ContractBytes => "_contractBytes",
    ReturnBytes => "_returnBytes",
}

/// Per-frame accumulator of proving-cost counters.
///
/// Carries the frame's `{is_create, is_deploy}` classification so every
/// recorded counter is tagged with the context it executed in. Completed
/// child frames fold into their parent with [`VirtualCounters::absorb`], in
/// the order the sub-frames finish.
#[derive(Clone, Debug)]
pub struct VirtualCounters {
    counts: [u64; Counter::COUNT],
    is_create: bool,
    is_deploy: bool,
}

impl VirtualCounters {
    /// Creates an empty accumulator tagged with the frame classification.
    pub fn new(is_create: bool, is_deploy: bool) -> VirtualCounters {
        VirtualCounters { counts: [0; Counter::COUNT], is_create, is_deploy }
    }

    fn bump(&mut self, counter: Counter, amount: u64) {
        self.counts[counter as usize] = self.counts[counter as usize].saturating_add(amount);
    }

    /// Records one execution of a plain opcode.
    pub fn record(&mut self, counter: Counter) {
        self.bump(counter, 1);
    }

    /// Records a PUSH-family execution together with its immediate width.
    pub fn record_push(&mut self, push_bytes: usize) {
        self.bump(Counter::OpPush, 1);
        self.bump(Counter::PushBytes, push_bytes as u64);
    }

    /// Records an EXP execution together with the exponent byte length.
    ///
    /// Callers record before the zero-exponent short-circuit, so trivial
    /// exponents still land in the accumulator.
    pub fn record_exp(&mut self, exponent_bytes: usize) {
        self.bump(Counter::OpExp, 1);
        self.bump(Counter::ExpBytes, exponent_bytes as u64);
    }

    /// Records a memory-sized opcode (SHA3, LOG, copies) with its input
    /// size.
    pub fn record_input(&mut self, counter: Counter, input_size: usize) {
        self.bump(counter, 1);
        self.bump(Counter::InputBytes, input_size as u64);
    }

    /// Records a call/create execution: the opcode's own counter plus the
    /// shared contract-call counter, with the callee bytecode length.
    pub fn record_contract_call(&mut self, counter: Counter, bytecode_len: usize) {
        self.bump(counter, 1);
        self.bump(Counter::ProcessContractCall, 1);
        self.bump(Counter::ContractBytes, bytecode_len as u64);
    }

    /// Records a termination opcode with the size of the returned or
    /// reverted payload.
    pub fn record_termination(&mut self, counter: Counter, data_len: usize) {
        self.bump(counter, 1);
        self.bump(Counter::ReturnBytes, data_len as u64);
    }

    /// Current total for one counter.
    pub fn get(&self, counter: Counter) -> u64 {
        self.counts[counter as usize]
    }

    /// Whether the owning frame runs constructor code.
    pub fn is_create(&self) -> bool {
        self.is_create
    }

    /// Whether the owning frame deploys a contract at transaction level.
    pub fn is_deploy(&self) -> bool {
        self.is_deploy
    }

    /// Folds a completed child frame's totals into this accumulator. The
    /// parent keeps its own classification tags.
    pub fn absorb(&mut self, child: &VirtualCounters) {
        for counter in Counter::ALL {
            self.bump(counter, child.counts[counter as usize]);
        }
    }

    /// Iterates the non-zero counters with their totals.
    pub fn iter(&self) -> impl Iterator<Item = (Counter, u64)> + '_ {
        Counter::ALL
            .into_iter()
            .filter(|counter| self.counts[*counter as usize] != 0)
            .map(|counter| (counter, self.counts[counter as usize]))
    }
}
