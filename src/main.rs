use apprentice::config::load_config;
use apprentice::startup;
use apprentice::utils::logger::init_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    if !startup::should_listen(&config) {
        info!(app_env = ?config.app_env, "Test environment detected, not listening");
        return;
    }

    if let Err(e) = startup::run(config).await {
        error!(error = %e, "Server terminated");
        std::process::exit(1);
    }
}
