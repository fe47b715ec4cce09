use alloy::primitives::U256;

/// The [`Log`] struct represents a record emitted by a `LOG0-LOG4` opcode
/// and handed to the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// The log topics (up to 4 for LOG0-LOG4)
    pub topics: Vec<U256>,

    /// The raw data contained in the log
    pub data: Vec<u8>,
}

impl Log {
    /// Creates a new [`Log`] with the given topics and data.
    pub fn new(topics: Vec<U256>, data: &[u8]) -> Log {
        Log { topics, data: data.to_vec() }
    }
}
