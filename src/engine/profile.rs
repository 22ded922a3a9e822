use crate::config::Config;
use crate::domain::{Address, TokenId, Transfer};
use std::collections::HashSet;

/// Who "we" are: own wallets, the funding source, bridges, custodial venues and
/// the native fee token. Read-only context for classification and accounting.
#[derive(Debug, Clone)]
pub struct Profile {
    wallets: HashSet<Address>,
    funding_address: Address,
    bridge_markers: Vec<String>,
    exchange_platforms: HashSet<String>,
    native_token: TokenId,
}

impl Profile {
    pub fn new(
        wallets: impl IntoIterator<Item = Address>,
        funding_address: Address,
        native_token: TokenId,
    ) -> Self {
        Self {
            wallets: wallets.into_iter().collect(),
            funding_address,
            bridge_markers: vec!["bridge".to_string()],
            exchange_platforms: HashSet::new(),
            native_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.wallet_addresses.iter().cloned(),
            config.funding_address.clone(),
            config.native_token.clone(),
        )
        .with_bridge_markers(config.bridge_markers.iter().cloned())
        .with_exchange_platforms(config.exchange_platforms.iter().cloned())
    }

    pub fn with_bridge_markers(mut self, markers: impl IntoIterator<Item = String>) -> Self {
        self.bridge_markers = markers.into_iter().map(|m| m.to_lowercase()).collect();
        self
    }

    pub fn with_exchange_platforms(mut self, platforms: impl IntoIterator<Item = String>) -> Self {
        self.exchange_platforms = platforms.into_iter().map(|p| p.to_lowercase()).collect();
        self
    }

    pub fn native_token(&self) -> &TokenId {
        &self.native_token
    }

    pub fn is_own_wallet(&self, address: &Address) -> bool {
        self.wallets.contains(address)
    }

    pub fn is_incoming(&self, transfer: &Transfer) -> bool {
        self.is_own_wallet(&transfer.to)
    }

    pub fn is_outgoing(&self, transfer: &Transfer) -> bool {
        self.is_own_wallet(&transfer.from)
    }

    pub fn is_funding(&self, address: &Address) -> bool {
        *address == self.funding_address
    }

    pub fn is_bridge(&self, address: &Address) -> bool {
        self.bridge_markers.iter().any(|m| address.contains(m))
    }

    pub fn is_exchange(&self, platform: &str) -> bool {
        self.exchange_platforms.contains(&platform.to_lowercase())
    }
}
