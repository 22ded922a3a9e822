use crate::domain::{Address, TokenId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_path: String,
    pub holdings_path: Option<String>,
    /// Own wallets; decides whether a row is incoming or outgoing.
    pub wallet_addresses: Vec<Address>,
    /// Sender whose transfers count as the initial funding deposit.
    pub funding_address: Address,
    pub bridge_markers: Vec<String>,
    pub exchange_platforms: Vec<String>,
    /// Token network fees are paid in.
    pub native_token: TokenId,
    pub reporting_currency: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let input_path = required(&env_map, "INPUT_PATH")?;

        let output_path = env_map
            .get("OUTPUT_PATH")
            .cloned()
            .unwrap_or_else(|| "annotated.csv".to_string());

        let holdings_path = env_map
            .get("HOLDINGS_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let wallet_addresses: Vec<Address> = parse_list(&required(&env_map, "WALLET_ADDRESSES")?)
            .into_iter()
            .map(Address::new)
            .collect();
        if wallet_addresses.is_empty() {
            return Err(ConfigError::InvalidValue(
                "WALLET_ADDRESSES".to_string(),
                "must list at least one address".to_string(),
            ));
        }

        let funding_address = Address::new(required(&env_map, "FUNDING_ADDRESS")?);

        let bridge_markers = parse_list(
            env_map
                .get("BRIDGE_MARKERS")
                .map(|s| s.as_str())
                .unwrap_or("bridge"),
        )
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();

        let exchange_platforms = parse_list(
            env_map
                .get("EXCHANGE_PLATFORMS")
                .map(|s| s.as_str())
                .unwrap_or("bitstamp"),
        )
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();

        let native_token = env_map
            .get("NATIVE_TOKEN")
            .map(|s| s.trim())
            .unwrap_or("ETH");
        if native_token.is_empty() {
            return Err(ConfigError::InvalidValue(
                "NATIVE_TOKEN".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let native_token = TokenId::new(native_token);

        let reporting_currency = env_map
            .get("REPORTING_CURRENCY")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_else(|| "EUR".to_string());

        Ok(Config {
            input_path,
            output_path,
            holdings_path,
            wallet_addresses,
            funding_address,
            bridge_markers,
            exchange_platforms,
            native_token,
            reporting_currency,
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
