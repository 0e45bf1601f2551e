//! Command-line and environment configuration.

use clap::Parser;
use pocketbridge_backend::BackendConfig;
use pocketbridge_shape::{DEFAULT_SIZE_LIMIT, ShaperConfig};
use secrecy::SecretString;
use std::time::Duration;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "pocketbridge=info";

/// Server arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "pocketbridge-mcp")]
#[command(about = "Expose a PocketBase backend to agents as MCP tools over stdio", long_about = None)]
#[command(version)]
pub struct Args {
    /// PocketBase base URL
    #[arg(long, env = "POCKETBASE_URL", default_value = BackendConfig::DEFAULT_URL)]
    pub url: String,

    /// Superuser email used to authenticate at startup
    #[arg(long, env = "POCKETBASE_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Superuser password used to authenticate at startup
    #[arg(long, env = "POCKETBASE_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Rendered size above which list responses are truncated, in characters
    #[arg(long, env = "POCKETBRIDGE_MAX_OUTPUT", default_value_t = DEFAULT_SIZE_LIMIT)]
    pub max_output_chars: usize,

    /// TCP connect timeout for backend requests
    #[arg(long, env = "POCKETBRIDGE_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Tools to hide from the agent, e.g. `delete_collection,restore_backup`
    #[arg(long = "disable-tool", env = "POCKETBRIDGE_DISABLED_TOOLS", value_delimiter = ',')]
    pub disabled_tools: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "POCKETBRIDGE_LOG_JSON")]
    pub log_json: bool,
}

/// Superuser credentials for startup authentication
#[derive(Debug)]
pub struct AdminCredentials {
    /// Email
    pub email: String,
    /// Password
    pub password: SecretString,
}

impl Args {
    /// Backend client configuration
    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(self.url.clone())
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    /// Response shaper configuration
    #[must_use]
    pub fn shaper_config(&self) -> ShaperConfig {
        ShaperConfig::new(self.url.trim_end_matches('/')).with_size_limit(self.max_output_chars)
    }

    /// Startup credentials, when both email and password are set
    #[must_use]
    pub fn admin_credentials(&self) -> Option<AdminCredentials> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminCredentials {
                    email: email.clone(),
                    password: SecretString::from(password.clone()),
                })
            }
            _ => None,
        }
    }
}
