use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "openai-plugin", about = "Serves the OpenAI datasource plugin over HTTP")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "PLUGIN_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// Tracing filter, e.g. `info` or `openai_plugin=debug`
    #[arg(long, env = "PLUGIN_LOG", default_value = "info")]
    pub log: String,

    /// Provider base URL used when a datasource does not set one
    #[arg(long, env = "PLUGIN_DEFAULT_BASE_URL", default_value = crate::plugin::model::DEFAULT_BASE_URL)]
    pub default_base_url: String,

    #[arg(long, env = "PLUGIN_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
