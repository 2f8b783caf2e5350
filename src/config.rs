use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the portal backend.
    pub base_url: String,
    /// Directory holding persisted client state (recent roots, theme).
    pub state_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("CISP_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
        if base_url.trim().is_empty() {
            anyhow::bail!("CISP_BASE_URL cannot be empty");
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            anyhow::bail!("CISP_BASE_URL must start with http:// or https://");
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let state_dir = match std::env::var("CISP_STATE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME required to locate the state directory"))?;
                PathBuf::from(home).join(".config").join("cisp-portal")
            }
        };

        let config = Self {
            base_url,
            state_dir,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("CISP base URL: {}", config.base_url);
        tracing::debug!("State directory: {}", config.state_dir.display());

        Ok(config)
    }
}
