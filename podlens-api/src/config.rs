//! Runtime configuration.

use anyhow::{Context, Result};
use jsonwebtoken::DecodingKey;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

/// Runtime configuration data.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// The server's logging config, which uses Rust's `env_logger` directives.
    pub rust_log: String,
    /// The port which the HTTP API is served on.
    pub http_port: u16,

    /// The preferred label key used to resolve logical application names.
    #[serde(default = "Config::default_app_label_key")]
    pub app_label_key: String,
    /// The label key tried when the preferred key resolves nothing.
    #[serde(default = "Config::default_fallback_label_key")]
    pub fallback_label_key: String,
    /// The base URL of the deploy tracking system linked from overviews.
    pub deployer_link_base: String,

    /// The JWT decoding key, base64 encoded HMAC secret.
    #[serde(deserialize_with = "Config::parse_decoding_key")]
    pub jwt_decoding_key: DecodingKey<'static>,
}

impl Config {
    /// Create a new config instance.
    ///
    /// Currently this routine just parses the runtime environment and builds the application
    /// config from that. In the future, this may take into account an optional config file as
    /// well.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Result<Self> {
        envy::from_env().context("error building config from env")
    }

    fn default_app_label_key() -> String {
        "app".into()
    }

    fn default_fallback_label_key() -> String {
        "app.kubernetes.io/name".into()
    }

    /// Parse the decoding key from the config source.
    fn parse_decoding_key<'de, D: Deserializer<'de>>(val: D) -> Result<DecodingKey<'static>, D::Error> {
        let b64_bytes: String = Deserialize::deserialize(val)?;
        let bytes = base64::decode(&b64_bytes).map_err(|err| DeError::custom(err.to_string()))?;
        Ok(DecodingKey::from_secret(&bytes).into_static())
    }
}
