//! ============================================================================
//! Payment Requester - Single subscription payment via eth_sendTransaction
//! ============================================================================
//! Submission only: no retry and no wait for confirmation.
//! ============================================================================

use std::sync::Arc;
use tracing::{info, warn};

use crate::connector::begin_install_redirect;
use crate::provider::{Navigator, RequestArguments, WalletProviderSource, METHOD_SEND_TRANSACTION};
use crate::types::{Outcome, PaymentOutcome, TransactionHash, WalletError};

/// Sends value transfers to the fixed payment recipient
pub struct PaymentRequester {
    source: Arc<dyn WalletProviderSource>,
    navigator: Arc<dyn Navigator>,
    recipient: String,
    install_url: String,
}

impl PaymentRequester {
    pub fn new(
        source: Arc<dyn WalletProviderSource>,
        navigator: Arc<dyn Navigator>,
        recipient: impl Into<String>,
        install_url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            navigator,
            recipient: recipient.into(),
            install_url: install_url.into(),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Submit one transfer of `amount` (hex wei, passed through untouched)
    /// from `from` to the recipient and return the provider's hash.
    pub async fn send_payment(&self, from: &str, amount: &str) -> Result<PaymentOutcome, WalletError> {
        let Some(ethereum) = self.source.ethereum() else {
            return Ok(begin_install_redirect(self.navigator.as_ref(), &self.install_url));
        };

        let tx = serde_json::json!({
            "to": self.recipient,
            "from": from,
            "value": amount,
        });

        info!("Requesting payment of {} from {} to {}", amount, from, self.recipient);

        let response = ethereum
            .request(RequestArguments::with_params(METHOD_SEND_TRANSACTION, vec![tx]))
            .await
            .map_err(|e| {
                warn!("Payment request failed: {}", e);
                WalletError::ProviderRequest(e.message)
            })?;

        match response {
            serde_json::Value::String(hash) => {
                info!("Payment submitted: {}", hash);
                Ok(Outcome::Completed(TransactionHash(hash)))
            }
            other => Err(WalletError::ProviderRequest(format!(
                "Unexpected {} response: {}",
                METHOD_SEND_TRANSACTION, other
            ))),
        }
    }
}
