//! Process-wide logging setup shared by the binaries.

/// Initialize tracing for the process.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
