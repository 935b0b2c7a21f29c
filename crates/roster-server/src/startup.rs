//! Server startup utilities.

use roster_core::RosterError;
use tracing::info;

/// Process exit code for a cache that cannot be reached at startup.
pub const EXIT_CACHE_UNAVAILABLE: i32 = 2;

/// Process exit code for every other startup failure.
pub const EXIT_FAILURE: i32 = 1;

/// Maps a fatal error to the process exit code.
pub fn exit_code(error: &RosterError) -> i32 {
    match error {
        RosterError::Cache(_) => EXIT_CACHE_UNAVAILABLE,
        _ => EXIT_FAILURE,
    }
}

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
    ____             __
   / __ \____  _____/ /____  _____
  / /_/ / __ \/ ___/ __/ _ \/ ___/
 / _, _/ /_/ (__  ) /_/  __/ /
/_/ |_|\____/____/\__/\___/_/
    "#
    );
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
}

/// Prints server startup information.
pub fn print_startup_info(addr: &str) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/users", addr);
    info!("Health:    http://{}/health", addr);
    info!("API Docs:  http://{}/swagger-ui", addr);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_failure_exits_with_2() {
        let err = RosterError::cache("PING failed: connection refused");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_other_failures_exit_with_1() {
        assert_eq!(exit_code(&RosterError::Database("refused".to_string())), 1);
        assert_eq!(exit_code(&RosterError::Configuration("bad port".to_string())), 1);
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
        print_startup_info("0.0.0.0:8000");
    }
}
