//! Backend Config

use clap::Args;

use crate::http::BackendSettings;

/// Backend connection settings.
#[derive(Debug, Clone, Args)]
pub struct BackendConfig {
    /// Storefront backend origin
    #[arg(
        long,
        env = "STOREFRONT_BACKEND_URL",
        default_value = "http://localhost:8080",
        value_parser = parse_backend_url
    )]
    pub backend_url: String,

    /// Session token sent as the `token` cookie
    #[arg(long, env = "STOREFRONT_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,
}

impl BackendConfig {
    /// Client settings for [`BackendClient`](crate::http::BackendClient).
    #[must_use]
    pub fn settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend_url.clone(),
            session_token: self
                .session_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        }
    }
}

fn parse_backend_url(value: &str) -> Result<String, String> {
    let url = reqwest::Url::parse(value).map_err(|error| format!("invalid URL: {error}"))?;

    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        scheme => Err(format!("unsupported scheme `{scheme}`, expected http or https")),
    }
}
