//! ============================================================================
//! Wallet Gate Configuration
//! ============================================================================
//! Defaults plus environment overrides. Binaries load `.env` before calling
//! [`WalletConfig::from_env`].
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::provider::EvmCapabilities;

/// Address that receives every subscription payment
pub const DEFAULT_PAYMENT_RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb";

/// Where the user is sent when no compatible wallet is installed
pub const DEFAULT_INSTALL_URL: &str = "https://metamask.io/download/";

pub const ENV_DB_PATH: &str = "WALLET_GATE_DB_PATH";
pub const ENV_RPC_URL: &str = "WALLET_GATE_RPC_URL";
pub const ENV_RECIPIENT: &str = "WALLET_GATE_RECIPIENT";
pub const ENV_INSTALL_URL: &str = "WALLET_GATE_INSTALL_URL";
pub const ENV_PROVIDER_FLAGS: &str = "WALLET_GATE_PROVIDER_FLAGS";

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Fixed recipient of `eth_sendTransaction` payments
    pub payment_recipient: String,
    /// Wallet install page used for the redirect
    pub install_url: String,
    /// Override for the session database location
    pub db_path: Option<String>,
    /// JSON-RPC endpoint standing in for an injected EVM provider
    pub rpc_url: Option<String>,
    /// Capability flags advertised by the RPC provider
    pub provider_flags: EvmCapabilities,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            payment_recipient: DEFAULT_PAYMENT_RECIPIENT.to_string(),
            install_url: DEFAULT_INSTALL_URL.to_string(),
            db_path: None,
            rpc_url: None,
            provider_flags: EvmCapabilities::default(),
        }
    }
}

impl WalletConfig {
    /// Build from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            payment_recipient: non_empty(ENV_RECIPIENT).unwrap_or(defaults.payment_recipient),
            install_url: non_empty(ENV_INSTALL_URL).unwrap_or(defaults.install_url),
            db_path: non_empty(ENV_DB_PATH),
            rpc_url: non_empty(ENV_RPC_URL),
            provider_flags: non_empty(ENV_PROVIDER_FLAGS)
                .map(|flags| EvmCapabilities::from_flag_list(&flags))
                .unwrap_or(defaults.provider_flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::from_lookup(|_| None);
        assert_eq!(config.payment_recipient, DEFAULT_PAYMENT_RECIPIENT);
        assert_eq!(config.install_url, DEFAULT_INSTALL_URL);
        assert!(config.db_path.is_none());
        assert!(config.rpc_url.is_none());
        assert_eq!(config.provider_flags, EvmCapabilities::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_RECIPIENT, "0x0000000000000000000000000000000000000001"),
            (ENV_RPC_URL, "http://127.0.0.1:8545"),
            (ENV_PROVIDER_FLAGS, "isCoinbaseWallet"),
            (ENV_DB_PATH, "   "),
        ]
        .into_iter()
        .collect();

        let config = WalletConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.payment_recipient, "0x0000000000000000000000000000000000000001");
        assert_eq!(config.rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert!(config.provider_flags.is_coinbase_wallet);
        assert!(!config.provider_flags.is_meta_mask);
        // Blank values are ignored
        assert!(config.db_path.is_none());
    }
}
