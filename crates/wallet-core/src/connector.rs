//! ============================================================================
//! Wallet Connector - Connect handshake across EVM and Solana providers
//! ============================================================================
//! Flow:
//! 1. Detect the injected wallet
//! 2. Phantom -> Solana `connect()`
//! 3. No EVM provider -> redirect to the install page (not an error)
//! 4. EVM -> `eth_requestAccounts`, first account wins
//!
//! The connector never persists anything itself; see `connect_and_persist`.
//! ============================================================================

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::provider::{
    Navigator, ProviderDetector, ProviderError, RequestArguments, WalletProviderSource,
    METHOD_ACCOUNTS, METHOD_REQUEST_ACCOUNTS,
};
use crate::store::SessionStore;
use crate::types::{ConnectOutcome, Outcome, WalletError, WalletSession, WalletVariant};

/// Message used when a provider rejects without saying why
const FALLBACK_CONNECT_ERROR: &str = "Failed to connect wallet";

/// Drives the connect handshake against whichever wallet is injected
pub struct WalletConnector {
    source: Arc<dyn WalletProviderSource>,
    navigator: Arc<dyn Navigator>,
    install_url: String,
    /// Held for the duration of one handshake
    pending: Mutex<()>,
}

impl WalletConnector {
    pub fn new(
        source: Arc<dyn WalletProviderSource>,
        navigator: Arc<dyn Navigator>,
        install_url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            navigator,
            install_url: install_url.into(),
            pending: Mutex::new(()),
        }
    }

    /// Which wallet would be used by the next `connect()`
    pub fn detect(&self) -> WalletVariant {
        ProviderDetector::new(self.source.as_ref()).detect()
    }

    /// Run one connect handshake.
    ///
    /// Returns `RedirectInitiated` when no compatible wallet exists; the
    /// install page has already been opened. A second call while one is in
    /// flight fails with `AlreadyPending`.
    pub async fn connect(&self) -> Result<ConnectOutcome, WalletError> {
        let _guard = self.pending.try_lock().map_err(|_| {
            warn!("Connect requested while another handshake is pending");
            WalletError::AlreadyPending
        })?;

        let variant = self.detect();

        if variant == WalletVariant::Phantom {
            return self.connect_phantom().await;
        }

        let Some(ethereum) = self.source.ethereum() else {
            return Ok(begin_install_redirect(self.navigator.as_ref(), &self.install_url));
        };

        debug!("Requesting accounts from {}", variant);
        let response = ethereum
            .request(RequestArguments::new(METHOD_REQUEST_ACCOUNTS))
            .await
            .map_err(provider_failure)?;

        let address = parse_accounts(METHOD_REQUEST_ACCOUNTS, response)?
            .into_iter()
            .next()
            .ok_or(WalletError::NoAccounts)?;

        let session = WalletSession::new(variant, address);
        info!("Connected {} wallet {}", variant, session.short_address());
        Ok(Outcome::Completed(session))
    }

    async fn connect_phantom(&self) -> Result<ConnectOutcome, WalletError> {
        let solana = self
            .source
            .solana()
            .ok_or_else(|| WalletError::ProviderRequest("Phantom provider disappeared".into()))?;

        let public_key = solana.connect().await.map_err(|e| {
            warn!("Phantom connect failed: {}", e);
            WalletError::ProviderRequest(e.message)
        })?;

        let session = WalletSession::new(WalletVariant::Phantom, public_key);
        info!("Connected Phantom wallet {}", session.short_address());
        Ok(Outcome::Completed(session))
    }

    /// Connect and, on success, persist the session. Redirects write nothing.
    pub async fn connect_and_persist(&self, sessions: &SessionStore) -> Result<ConnectOutcome, WalletError> {
        let outcome = self.connect().await?;
        if let Outcome::Completed(session) = &outcome {
            sessions.save_session(session)?;
        }
        Ok(outcome)
    }

    /// Already-authorised account, without prompting the user.
    /// `None` when there is no EVM provider or nothing is authorised.
    pub async fn current_account(&self) -> Result<Option<String>, WalletError> {
        let Some(ethereum) = self.source.ethereum() else {
            return Ok(None);
        };

        let response = ethereum
            .request(RequestArguments::new(METHOD_ACCOUNTS))
            .await
            .map_err(provider_failure)?;

        Ok(parse_accounts(METHOD_ACCOUNTS, response)?.into_iter().next())
    }
}

/// Fire the install redirect and report it as an outcome
pub(crate) fn begin_install_redirect<T>(navigator: &dyn Navigator, url: &str) -> Outcome<T> {
    info!("No EVM wallet detected, redirecting to {}", url);
    navigator.redirect(url);
    Outcome::RedirectInitiated { url: url.to_string() }
}

/// Forward the EVM provider's own message; never swallow it
fn provider_failure(err: ProviderError) -> WalletError {
    warn!("Provider request failed: {}", err);
    if err.message.trim().is_empty() {
        WalletError::ProviderRequest(FALLBACK_CONNECT_ERROR.to_string())
    } else {
        WalletError::ProviderRequest(err.message)
    }
}

/// `null` counts as an empty list; anything else must be a list of strings
fn parse_accounts(method: &str, response: serde_json::Value) -> Result<Vec<String>, WalletError> {
    match response {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(account) => Ok(account),
                other => Err(WalletError::ProviderRequest(format!(
                    "Unexpected {} response entry: {}",
                    method, other
                ))),
            })
            .collect(),
        other => Err(WalletError::ProviderRequest(format!(
            "Unexpected {} response: {}",
            method, other
        ))),
    }
}
