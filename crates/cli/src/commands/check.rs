//! Configuration check command

use crate::output::{print_error, print_success, print_warning};
use crate::Cli;
use anyhow::Result;

pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.to_config();

    match config.validate() {
        Ok(()) => print_success("Required configuration is present"),
        Err(e) => {
            print_error(&format!("Configuration invalid: {}", e));
            anyhow::bail!("Configuration check failed");
        }
    }

    if config.notification_configured() {
        print_success("Notification dispatch is configured");
    } else {
        print_warning(
            "Notification endpoint or recipient not set; reports will be stored but not dispatched",
        );
    }

    match config.http_timeout() {
        Some(timeout) => print_success(&format!(
            "Outbound calls bounded to {}s",
            timeout.as_secs()
        )),
        None => print_warning("No HTTP timeout configured; outbound calls may block indefinitely"),
    }

    Ok(())
}
