//! ============================================================================
//! Core Types for Wallet Gate
//! ============================================================================
//! Wallet variants, the normalized session shape, handshake outcomes and the
//! error taxonomy shared by the connector and the payment requester.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::StoreError;

/// Wallet brands recognised by the detector.
/// Exactly one variant is assigned per detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletVariant {
    #[serde(rename = "MetaMask")]
    MetaMask,
    #[serde(rename = "Coinbase Wallet")]
    CoinbaseWallet,
    #[serde(rename = "WalletConnect")]
    WalletConnect,
    #[serde(rename = "Phantom")]
    Phantom,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl WalletVariant {
    /// Human-readable name, also the value persisted under `walletType`
    pub fn display_name(&self) -> &'static str {
        match self {
            WalletVariant::MetaMask => "MetaMask",
            WalletVariant::CoinbaseWallet => "Coinbase Wallet",
            WalletVariant::WalletConnect => "WalletConnect",
            WalletVariant::Phantom => "Phantom",
            WalletVariant::Unknown => "Unknown",
        }
    }

    /// Whether this variant talks the EVM `request` protocol
    pub fn is_evm(&self) -> bool {
        matches!(
            self,
            WalletVariant::MetaMask | WalletVariant::CoinbaseWallet | WalletVariant::WalletConnect
        )
    }
}

impl fmt::Display for WalletVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for WalletVariant {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MetaMask" => Ok(WalletVariant::MetaMask),
            "Coinbase Wallet" | "CoinbaseWallet" => Ok(WalletVariant::CoinbaseWallet),
            "WalletConnect" => Ok(WalletVariant::WalletConnect),
            "Phantom" => Ok(WalletVariant::Phantom),
            "Unknown" => Ok(WalletVariant::Unknown),
            other => Err(WalletError::UnknownVariant(other.to_string())),
        }
    }
}

/// A connected wallet: its address paired with the detected variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub wallet_type: WalletVariant,
    pub address: String,
}

impl WalletSession {
    pub fn new(wallet_type: WalletVariant, address: impl Into<String>) -> Self {
        Self {
            wallet_type,
            address: address.into(),
        }
    }

    /// Abbreviated address for display, e.g. `0x742d...0bEb`.
    /// Always the first six and last four characters, so a short address
    /// shows overlapping halves.
    pub fn short_address(&self) -> String {
        let chars: Vec<char> = self.address.chars().collect();
        let head: String = chars.iter().take(6).collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Transaction identifier exactly as assigned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(pub String);

impl TransactionHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of an operation that may have handed the user off to the wallet
/// install page instead of completing.
///
/// `RedirectInitiated` is not a failure: callers must not surface it as an
/// error to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    RedirectInitiated { url: String },
}

impl<T> Outcome<T> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Outcome::RedirectInitiated { .. })
    }

    /// The completed value, if any
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::RedirectInitiated { .. } => None,
        }
    }
}

pub type ConnectOutcome = Outcome<WalletSession>;
pub type PaymentOutcome = Outcome<TransactionHash>;

/// Errors surfaced by wallet operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("No accounts returned")]
    NoAccounts,

    #[error("{0}")]
    ProviderRequest(String),

    #[error("A wallet connection request is already pending")]
    AlreadyPending,

    #[error("Unknown wallet type: {0}")]
    UnknownVariant(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
