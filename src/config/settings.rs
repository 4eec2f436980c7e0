//! Runtime settings

use std::time::Duration;

use crate::config::CliArgs;

/// Runtime configuration settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub connect_timeout: Duration,
    pub with_enterprise: bool,
}

impl From<CliArgs> for Settings {
    fn from(args: CliArgs) -> Self {
        Settings {
            connect_timeout: Duration::from_millis(args.connect_timeout_ms),
            with_enterprise: args.with_enterprise,
        }
    }
}
