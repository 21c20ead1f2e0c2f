//! Structured logging schema and field name constants for jotwise.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same field names in every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (stream chunks, raw text) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → cycle → sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "enhance"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "decoder", "stripper", "cycle", "pool", "openai"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "accumulate", "strip", "update_summary", "generate_stream"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Authenticated user UUID.
pub const USER_ID: &str = "user_id";

/// Enhancement cycle phase.
pub const PHASE: &str = "phase";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of raw chunks received from a stream.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Total bytes received from a stream.
pub const BYTE_COUNT: &str = "byte_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// HTTP status returned by an upstream service.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Every field name above, for schema checks and log tooling.
pub const ALL_FIELDS: &[&str] = &[
    REQUEST_ID,
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    NOTE_ID,
    USER_ID,
    PHASE,
    DURATION_MS,
    CHUNK_COUNT,
    BYTE_COUNT,
    PROMPT_LEN,
    RESPONSE_LEN,
    POOL_SIZE,
    POOL_IDLE,
    MODEL,
    STATUS,
    SUCCESS,
    ERROR_MSG,
];
