//! ============================================================================
//! WALLET-CORE: Wallet sessions and subscription gating
//! ============================================================================
//! This crate handles the client-side wallet and billing logic:
//! - Detecting the injected wallet (MetaMask, Coinbase, WalletConnect, Phantom)
//! - Driving the connect handshake and the install redirect
//! - Evaluating the locally persisted subscription against wall-clock time
//! - Submitting the single subscription payment
//! ============================================================================

pub mod config;
pub mod connector;
pub mod payment;
pub mod provider;
pub mod store;
pub mod subscription;
pub mod types;

// Re-export main types for convenience
pub use types::*;
pub use config::WalletConfig;
pub use connector::WalletConnector;
pub use payment::PaymentRequester;
pub use provider::{
    EvmCapabilities, EvmProvider, HttpEvmProvider, InjectedProviders, Navigator, ProviderDetector,
    ProviderError, RequestArguments, SolanaProvider, WalletProviderSource,
};
pub use store::{KeyValueStore, MemoryStore, RedbStore, SessionStore, StoreError, UserProfile};
pub use subscription::{
    AccessDenied, SubscriptionBadge, SubscriptionEvaluator, SubscriptionGate, SubscriptionRecord,
    SubscriptionStatus,
};
