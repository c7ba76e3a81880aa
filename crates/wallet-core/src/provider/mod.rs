//! ============================================================================
//! Provider Module - Injected wallet capabilities
//! ============================================================================
//! Abstracts the wallet objects a host environment injects so detection and
//! the connect handshake never read process-wide globals.
//!
//! ## Capabilities
//! - **EvmProvider**: EIP-1193 style `request({ method, params })`
//! - **SolanaProvider**: Phantom style `connect()` returning a public key
//! - **WalletProviderSource**: whichever of the two the environment exposes
//! - **Navigator**: the one-way install redirect
//!
//! ## Usage
//! ```rust,ignore
//! use wallet_core::provider::{InjectedProviders, ProviderDetector};
//!
//! let providers = InjectedProviders::new().with_ethereum(my_evm_provider);
//! let variant = ProviderDetector::new(&providers).detect();
//! ```
//! ============================================================================

mod detector;
mod rpc;

pub use detector::ProviderDetector;
pub use rpc::HttpEvmProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const METHOD_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const METHOD_ACCOUNTS: &str = "eth_accounts";
pub const METHOD_SEND_TRANSACTION: &str = "eth_sendTransaction";

/// Arguments of a single EVM `request` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<serde_json::Value>>,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(method: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
        }
    }
}

/// Brand flags an EVM provider advertises about itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmCapabilities {
    pub is_meta_mask: bool,
    pub is_coinbase_wallet: bool,
    pub is_wallet_connect: bool,
}

impl EvmCapabilities {
    /// Parse a comma separated flag list such as `isMetaMask,isWalletConnect`.
    /// Unrecognised entries are ignored.
    pub fn from_flag_list(list: &str) -> Self {
        let mut caps = Self::default();
        for flag in list.split(',').map(str::trim) {
            match flag {
                "isMetaMask" => caps.is_meta_mask = true,
                "isCoinbaseWallet" => caps.is_coinbase_wallet = true,
                "isWalletConnect" => caps.is_wallet_connect = true,
                _ => {}
            }
        }
        caps
    }
}

/// Rejection reported by a provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    /// EIP-1193 / JSON-RPC error code when the provider supplied one
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// EVM-style injected provider
#[async_trait]
pub trait EvmProvider: Send + Sync {
    fn capabilities(&self) -> EvmCapabilities;

    async fn request(&self, args: RequestArguments) -> Result<serde_json::Value, ProviderError>;
}

/// Solana-style injected provider
#[async_trait]
pub trait SolanaProvider: Send + Sync {
    fn is_phantom(&self) -> bool;

    /// Prompt the user and return the connected public key as a string
    async fn connect(&self) -> Result<String, ProviderError>;
}

/// The set of wallet providers present in the host environment
pub trait WalletProviderSource: Send + Sync {
    fn ethereum(&self) -> Option<Arc<dyn EvmProvider>>;

    fn solana(&self) -> Option<Arc<dyn SolanaProvider>>;
}

/// Performs the install-page redirect. After it fires the host is expected
/// to abandon the current flow.
pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Plain holder for whichever providers were injected
#[derive(Clone, Default)]
pub struct InjectedProviders {
    ethereum: Option<Arc<dyn EvmProvider>>,
    solana: Option<Arc<dyn SolanaProvider>>,
}

impl InjectedProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ethereum(mut self, provider: Arc<dyn EvmProvider>) -> Self {
        self.ethereum = Some(provider);
        self
    }

    pub fn with_solana(mut self, provider: Arc<dyn SolanaProvider>) -> Self {
        self.solana = Some(provider);
        self
    }
}

impl WalletProviderSource for InjectedProviders {
    fn ethereum(&self) -> Option<Arc<dyn EvmProvider>> {
        self.ethereum.clone()
    }

    fn solana(&self) -> Option<Arc<dyn SolanaProvider>> {
        self.solana.clone()
    }
}

/// Scriptable providers and navigator shared by the unit tests
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    /// EVM provider that answers every call with a canned response
    pub struct MockEvm {
        pub caps: EvmCapabilities,
        pub response: Mutex<Result<serde_json::Value, ProviderError>>,
        pub calls: Mutex<Vec<RequestArguments>>,
        pub delay_ms: u64,
    }

    impl MockEvm {
        pub fn new(caps: EvmCapabilities, response: Result<serde_json::Value, ProviderError>) -> Self {
            Self {
                caps,
                response: Mutex::new(response),
                calls: Mutex::new(Vec::new()),
                delay_ms: 0,
            }
        }

        pub fn accounts(caps: EvmCapabilities, accounts: &[&str]) -> Self {
            Self::new(caps, Ok(serde_json::json!(accounts)))
        }

        pub fn set_response(&self, response: Result<serde_json::Value, ProviderError>) {
            *self.response.lock().unwrap() = response;
        }

        pub fn calls(&self) -> Vec<RequestArguments> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EvmProvider for MockEvm {
        fn capabilities(&self) -> EvmCapabilities {
            self.caps
        }

        async fn request(&self, args: RequestArguments) -> Result<serde_json::Value, ProviderError> {
            self.calls.lock().unwrap().push(args);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            self.response.lock().unwrap().clone()
        }
    }

    pub struct MockSolana {
        pub phantom: bool,
        pub result: Result<String, ProviderError>,
    }

    #[async_trait]
    impl SolanaProvider for MockSolana {
        fn is_phantom(&self) -> bool {
            self.phantom
        }

        async fn connect(&self) -> Result<String, ProviderError> {
            self.result.clone()
        }
    }

    /// Records every redirect instead of navigating
    #[derive(Default)]
    pub struct RecordingNavigator {
        pub visited: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub fn count(&self) -> usize {
            self.visited.lock().unwrap().len()
        }
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, url: &str) {
            self.visited.lock().unwrap().push(url.to_string());
        }
    }

    pub fn metamask() -> EvmCapabilities {
        EvmCapabilities {
            is_meta_mask: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_list_parsing() {
        let caps = EvmCapabilities::from_flag_list("isMetaMask, isWalletConnect,bogus");
        assert!(caps.is_meta_mask);
        assert!(!caps.is_coinbase_wallet);
        assert!(caps.is_wallet_connect);
        assert_eq!(EvmCapabilities::from_flag_list(""), EvmCapabilities::default());
    }

    #[test]
    fn test_request_arguments_serialization() {
        let bare = serde_json::to_value(RequestArguments::new(METHOD_ACCOUNTS)).unwrap();
        assert_eq!(bare, serde_json::json!({ "method": "eth_accounts" }));

        let with = RequestArguments::with_params(METHOD_SEND_TRANSACTION, vec![serde_json::json!({"to": "0x1"})]);
        let value = serde_json::to_value(with).unwrap();
        assert_eq!(value["params"][0]["to"], "0x1");
    }

    #[test]
    fn test_provider_error_displays_message_verbatim() {
        let err = ProviderError::with_code(4001, "User rejected the request.");
        assert_eq!(err.to_string(), "User rejected the request.");
        assert_eq!(err.code, Some(4001));
    }
}
