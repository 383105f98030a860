// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::Config;

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "wiki";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// A missing file is not an error; defaults keep the wiki on port 8080
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("storage.pages_dir", "texts")?
            .set_default("storage.templates_dir", "templates")?
            .set_default("storage.assets_dir", "assets")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", "plainwiki")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WIKI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load using the `--config <path>` argument when present
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = config_path_from_args(std::env::args().skip(1));
        Self::load_from(&path)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Pick the config path out of command line arguments
fn config_path_from_args(mut args: impl Iterator<Item = String>) -> String {
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            if let Some(path) = args.next() {
                return path;
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}
