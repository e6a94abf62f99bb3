use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

pub const DEFAULT_INDEX_URL: &str = "https://blu-ray-rezensionen.net/ultra-hd-blu-ray";
pub const DEFAULT_LINK_TEXT: &str = "UHD";

/// Runtime settings. Every key can be overridden with a `BDR_` environment
/// variable, e.g. `BDR_TIMEOUT_SECS=10`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub index_url: String,
    /// Anchor text that marks a link on the index page as a review.
    pub link_text: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = defaults()?
            .add_source(Environment::with_prefix("BDR"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("index_url", DEFAULT_INDEX_URL)?
        .set_default("link_text", DEFAULT_LINK_TEXT)?
        .set_default(
            "user_agent",
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        )?
        .set_default("timeout_secs", 30)?)
}
