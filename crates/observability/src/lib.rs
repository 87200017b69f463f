//! Tracing/logging setup shared by whatever hosts the core (desktop shell,
//! service, test harness).

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
