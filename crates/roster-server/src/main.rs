//! # Roster Server
//!
//! Entry point for the user directory service.

use roster_config::{ConfigLoader, ObservabilityConfig};
use roster_server::{
    logging::init_logging,
    startup::{exit_code, print_banner},
    AppBuilder,
};
use tracing::error;

#[tokio::main]
async fn main() {
    let config = ConfigLoader::from_default_location().map(ConfigLoader::into_config);

    // Logging needs the configured level, so a config failure is reported
    // through a default subscriber.
    let observability = config
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_else(|_| ObservabilityConfig::default());
    init_logging(&observability);
    print_banner();

    let result = match config {
        Ok(config) => AppBuilder::new().with_config(config).run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!(code = e.error_code(), "Application error: {}", e);
        std::process::exit(exit_code(&e));
    }
}
