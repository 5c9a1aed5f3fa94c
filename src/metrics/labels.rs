//! Label keys and values

/// Label key for the resolution strategy
pub const STRATEGY: &str = "strategy";
/// Label key for a failure reason
pub const REASON: &str = "reason";
/// Label key for a verification outcome
pub const RESULT: &str = "result";

/// Plain DNS contact points
pub const STRATEGY_DIRECT: &str = "direct";
/// SNI proxy with per-node TLS identities
pub const STRATEGY_CLOUD: &str = "cloud";

/// Certificate chain accepted
pub const RESULT_OK: &str = "ok";
/// Certificate chain rejected
pub const RESULT_REJECTED: &str = "rejected";
