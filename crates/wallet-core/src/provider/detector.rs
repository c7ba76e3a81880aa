//! ============================================================================
//! Provider Detector - Classify the injected wallet
//! ============================================================================
//! EVM providers win over Solana ones. Within EVM the brand flags are checked
//! in priority order MetaMask -> Coinbase Wallet -> WalletConnect.
//! ============================================================================

use tracing::debug;

use super::WalletProviderSource;
use crate::types::WalletVariant;

/// Read-only view over a provider source that classifies the wallet present
pub struct ProviderDetector<'a> {
    source: &'a dyn WalletProviderSource,
}

impl<'a> ProviderDetector<'a> {
    pub fn new(source: &'a dyn WalletProviderSource) -> Self {
        Self { source }
    }

    /// Classify the wallet exposed by the source. Never mutates it.
    pub fn detect(&self) -> WalletVariant {
        let ethereum = self.source.ethereum();
        let solana = self.source.solana();

        let variant = match (ethereum, solana) {
            (None, None) => WalletVariant::Unknown,
            (Some(eth), _) => {
                let caps = eth.capabilities();
                if caps.is_meta_mask {
                    WalletVariant::MetaMask
                } else if caps.is_coinbase_wallet {
                    WalletVariant::CoinbaseWallet
                } else if caps.is_wallet_connect {
                    WalletVariant::WalletConnect
                } else {
                    // Unflagged EVM providers are assumed MetaMask-compatible.
                    // This is a heuristic, not a verified capability.
                    WalletVariant::MetaMask
                }
            }
            (None, Some(sol)) if sol.is_phantom() => WalletVariant::Phantom,
            (None, Some(_)) => WalletVariant::Unknown,
        };

        debug!("Detected wallet: {}", variant);
        variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{metamask, MockEvm, MockSolana};
    use crate::provider::{EvmCapabilities, InjectedProviders};
    use std::sync::Arc;

    fn evm(caps: EvmCapabilities) -> InjectedProviders {
        InjectedProviders::new().with_ethereum(Arc::new(MockEvm::accounts(caps, &[])))
    }

    fn phantom(flag: bool) -> Arc<MockSolana> {
        Arc::new(MockSolana {
            phantom: flag,
            result: Ok("pubkey".into()),
        })
    }

    #[test]
    fn test_no_provider_is_unknown() {
        let providers = InjectedProviders::new();
        assert_eq!(ProviderDetector::new(&providers).detect(), WalletVariant::Unknown);
    }

    #[test]
    fn test_evm_flag_priority() {
        let all = EvmCapabilities {
            is_meta_mask: true,
            is_coinbase_wallet: true,
            is_wallet_connect: true,
        };
        assert_eq!(ProviderDetector::new(&evm(all)).detect(), WalletVariant::MetaMask);

        let coinbase_and_wc = EvmCapabilities {
            is_coinbase_wallet: true,
            is_wallet_connect: true,
            ..Default::default()
        };
        assert_eq!(
            ProviderDetector::new(&evm(coinbase_and_wc)).detect(),
            WalletVariant::CoinbaseWallet
        );

        let wc = EvmCapabilities {
            is_wallet_connect: true,
            ..Default::default()
        };
        assert_eq!(ProviderDetector::new(&evm(wc)).detect(), WalletVariant::WalletConnect);
    }

    #[test]
    fn test_coinbase_only() {
        let caps = EvmCapabilities {
            is_coinbase_wallet: true,
            ..Default::default()
        };
        assert_eq!(ProviderDetector::new(&evm(caps)).detect(), WalletVariant::CoinbaseWallet);
    }

    #[test]
    fn test_unflagged_evm_defaults_to_metamask() {
        let providers = evm(EvmCapabilities::default());
        assert_eq!(ProviderDetector::new(&providers).detect(), WalletVariant::MetaMask);
    }

    #[test]
    fn test_evm_takes_precedence_over_phantom() {
        let providers = evm(metamask()).with_solana(phantom(true));
        assert_eq!(ProviderDetector::new(&providers).detect(), WalletVariant::MetaMask);
    }

    #[test]
    fn test_phantom_only() {
        let providers = InjectedProviders::new().with_solana(phantom(true));
        assert_eq!(ProviderDetector::new(&providers).detect(), WalletVariant::Phantom);
    }

    #[test]
    fn test_solana_without_phantom_flag_is_unknown() {
        let providers = InjectedProviders::new().with_solana(phantom(false));
        assert_eq!(ProviderDetector::new(&providers).detect(), WalletVariant::Unknown);
    }

    #[test]
    fn test_detect_is_repeatable() {
        let providers = evm(metamask());
        let detector = ProviderDetector::new(&providers);
        assert_eq!(detector.detect(), detector.detect());
    }
}
