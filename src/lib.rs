// Step Tracker Core - Rust motion engine
// Accelerometer-driven step detection with broadcast state fan-out

// Module declarations
pub mod api;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod managers;
pub mod sensor;
pub mod testing;

#[cfg(feature = "debug_http")]
pub mod http;

// Re-exports for convenience
pub use api::*;

/// Initialize process-wide logging for binaries and tests.
///
/// Safe to call more than once; only the first subscriber wins.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        // Verify all modules are accessible
        // This ensures the crate compiles with proper module hierarchy
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        super::init_logging();
        super::init_logging();
    }
}
