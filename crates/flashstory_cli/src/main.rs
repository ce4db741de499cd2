//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `flashstory_core` linkage.
//! - Print the content API settings resolved from the environment.

use flashstory_core::CoreConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("flashstory_core ping={}", flashstory_core::ping());
    println!("flashstory_core version={}", flashstory_core::core_version());

    match CoreConfig::from_env() {
        Ok(config) => {
            println!("api_base_url={}", config.api_base_url);
            println!("request_timeout_secs={}", config.request_timeout.as_secs());
            println!("random_batch_size={}", config.random_batch_size);
            println!("prefetch_threshold_percent={}", config.prefetch_threshold_percent);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("config error: {err}");
            ExitCode::FAILURE
        }
    }
}
