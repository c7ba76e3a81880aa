//! Typed access to the persisted wallet session, user profile and auth token.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    KeyValueStore, StoreError, KEY_SUBSCRIPTION, KEY_TOKEN, KEY_USER, KEY_WALLET_ADDRESS,
    KEY_WALLET_TYPE,
};
use crate::subscription::SubscriptionRecord;
use crate::types::{WalletSession, WalletVariant};

/// Profile written by the login flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Facade over a [`KeyValueStore`] using the fixed client keys
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// The underlying store
    pub fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    /// Persist a freshly connected session, overwriting any previous one
    pub fn save_session(&self, session: &WalletSession) -> Result<(), StoreError> {
        self.kv.set(KEY_WALLET_ADDRESS, &session.address)?;
        self.kv.set(KEY_WALLET_TYPE, session.wallet_type.display_name())?;
        info!("Saved {} session for {}", session.wallet_type, session.short_address());
        Ok(())
    }

    /// The previously connected session, if both keys are present
    pub fn load_session(&self) -> Result<Option<WalletSession>, StoreError> {
        let address = self.kv.get(KEY_WALLET_ADDRESS)?;
        let wallet_type = self.kv.get(KEY_WALLET_TYPE)?;

        match (address, wallet_type) {
            (Some(address), Some(wallet_type)) => match wallet_type.parse::<WalletVariant>() {
                Ok(variant) => Ok(Some(WalletSession::new(variant, address))),
                Err(e) => {
                    warn!("Ignoring stored session: {}", e);
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }

    /// Forget the wallet session
    pub fn clear_session(&self) -> Result<(), StoreError> {
        self.kv.remove(KEY_WALLET_ADDRESS)?;
        self.kv.remove(KEY_WALLET_TYPE)?;
        info!("Cleared wallet session");
        Ok(())
    }

    pub fn save_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        let json = serde_json::to_string(user).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(KEY_USER, &json)
    }

    /// Logged-in user profile. Unparseable JSON is treated as logged out.
    pub fn load_user(&self) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.kv.get(KEY_USER)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Ignoring malformed user record: {}", e);
                Ok(None)
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.kv.set(KEY_TOKEN, token)
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        self.kv.get(KEY_TOKEN)
    }

    /// Write a subscription record on behalf of the billing flow
    pub fn save_subscription(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(KEY_SUBSCRIPTION, &json)
    }

    /// Drop the auth token and user profile. The wallet session and the
    /// subscription record are left in place.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.kv.remove(KEY_TOKEN)?;
        self.kv.remove(KEY_USER)?;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sessions() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_session_round_trip_uses_fixed_keys() {
        let store = sessions();
        let session = WalletSession::new(WalletVariant::CoinbaseWallet, "0xabc");
        store.save_session(&session).unwrap();

        assert_eq!(store.kv().get("walletAddress").unwrap().as_deref(), Some("0xabc"));
        assert_eq!(store.kv().get("walletType").unwrap().as_deref(), Some("Coinbase Wallet"));
        assert_eq!(store.load_session().unwrap(), Some(session));
    }

    #[test]
    fn test_reconnect_overwrites_session() {
        let store = sessions();
        store
            .save_session(&WalletSession::new(WalletVariant::MetaMask, "0x1"))
            .unwrap();
        store
            .save_session(&WalletSession::new(WalletVariant::Phantom, "So1ana"))
            .unwrap();
        assert_eq!(
            store.load_session().unwrap(),
            Some(WalletSession::new(WalletVariant::Phantom, "So1ana"))
        );
    }

    #[test]
    fn test_partial_or_unknown_session_is_none() {
        let store = sessions();
        store.kv().set("walletAddress", "0xabc").unwrap();
        assert_eq!(store.load_session().unwrap(), None);

        store.kv().set("walletType", "Ledger").unwrap();
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn test_logout_keeps_wallet_session() {
        let store = sessions();
        store
            .save_session(&WalletSession::new(WalletVariant::MetaMask, "0xabc"))
            .unwrap();
        store.set_token("jwt").unwrap();
        store
            .save_user(&UserProfile {
                name: "Ada".into(),
                extra: Default::default(),
            })
            .unwrap();

        store.logout().unwrap();

        assert_eq!(store.token().unwrap(), None);
        assert_eq!(store.load_user().unwrap(), None);
        assert!(store.load_session().unwrap().is_some());
    }

    #[test]
    fn test_clear_session() {
        let store = sessions();
        store
            .save_session(&WalletSession::new(WalletVariant::MetaMask, "0xabc"))
            .unwrap();
        store.clear_session().unwrap();
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn test_user_profile_keeps_extra_fields() {
        let store = sessions();
        store
            .kv()
            .set("user", r#"{"name":"Ada","email":"ada@example.com"}"#)
            .unwrap();
        let user = store.load_user().unwrap().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.extra["email"], "ada@example.com");

        store.kv().set("user", "not json").unwrap();
        assert_eq!(store.load_user().unwrap(), None);
    }
}
