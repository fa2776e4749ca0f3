use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::args::OperatorArgs;
use crate::error::Result;

/// Argument names understood by the batch matmul operator.
pub const ARG_BROADCAST: &str = "broadcast";
pub const ARG_TRANS_A: &str = "trans_a";
pub const ARG_TRANS_B: &str = "trans_b";

const KNOWN_ARGS: [&str; 3] = [ARG_BROADCAST, ARG_TRANS_A, ARG_TRANS_B];

/// Configuration for [`BatchMatMul`](crate::BatchMatMul), fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchMatMulConfig {
    /// Allow batch dims of size 1 (or missing leading dims) to broadcast.
    /// When false the two batch shapes must be identical.
    pub broadcast: bool,
    /// Treat the trailing two dims of A as transposed.
    pub trans_a: bool,
    /// Treat the trailing two dims of B as transposed.
    pub trans_b: bool,
}

impl BatchMatMulConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn with_trans_a(mut self, trans_a: bool) -> Self {
        self.trans_a = trans_a;
        self
    }

    pub fn with_trans_b(mut self, trans_b: bool) -> Self {
        self.trans_b = trans_b;
        self
    }

    /// Build a configuration from declarative named arguments.
    ///
    /// Missing arguments take their defaults. Unrecognised names are ignored
    /// with a warning.
    pub fn from_args(args: &OperatorArgs) -> Result<Self> {
        for name in args.names().filter(|n| !KNOWN_ARGS.contains(n)) {
            warn!(argument = name, "ignoring unknown batch matmul argument");
        }
        Ok(Self {
            broadcast: args.get_bool(ARG_BROADCAST, false)?,
            trans_a: args.get_bool(ARG_TRANS_A, false)?,
            trans_b: args.get_bool(ARG_TRANS_B, false)?,
        })
    }

    /// Parse a configuration object such as `{"broadcast": true}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
