//! Payment provider identifiers and catalog kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::IntentError;

/// The payment rails this engine can initiate and reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Telebirr mobile-money wallet.
    Telebirr,
    /// Chapa hosted checkout (cards and wallets).
    Chapa,
    /// ArifPay wallet aggregator.
    Arifpay,
    /// Cash on delivery.
    Cod,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Telebirr,
        ProviderId::Chapa,
        ProviderId::Arifpay,
        ProviderId::Cod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Telebirr => "telebirr",
            ProviderId::Chapa => "chapa",
            ProviderId::Arifpay => "arifpay",
            ProviderId::Cod => "cod",
        }
    }

    /// Cash on delivery has no remote checkout; its intents start out pending.
    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, ProviderId::Cod)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telebirr" => Ok(ProviderId::Telebirr),
            "chapa" => Ok(ProviderId::Chapa),
            "arifpay" => Ok(ProviderId::Arifpay),
            "cod" => Ok(ProviderId::Cod),
            _ => Err(IntentError::unknown_provider(s)),
        }
    }
}

/// Catalog classification of a provider, used to branch billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Card,
    LocalWallet,
    Cod,
    Bank,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Card => "card",
            ProviderKind::LocalWallet => "local_wallet",
            ProviderKind::Cod => "cod",
            ProviderKind::Bank => "bank",
        }
    }

    /// Parses a catalog value; unknown kinds yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(ProviderKind::Card),
            "local_wallet" => Some(ProviderKind::LocalWallet),
            "cod" => Some(ProviderKind::Cod),
            "bank" => Some(ProviderKind::Bank),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_ids_round_trip() {
        for id in ProviderId::ALL {
            assert_eq!(id.as_str().parse::<ProviderId>().unwrap(), id);
        }
    }

    #[test]
    fn provider_id_parse_is_case_insensitive() {
        assert_eq!("Chapa".parse::<ProviderId>().unwrap(), ProviderId::Chapa);
    }

    #[test]
    fn unknown_provider_is_reported_by_name() {
        let err = "paypal".parse::<ProviderId>().unwrap_err();
        assert!(matches!(err, IntentError::UnknownProvider(ref p) if p == "paypal"));
    }

    #[test]
    fn only_cod_is_cash_on_delivery() {
        assert!(ProviderId::Cod.is_cash_on_delivery());
        assert!(!ProviderId::Chapa.is_cash_on_delivery());
    }

    #[test]
    fn provider_kind_parses_catalog_values() {
        assert_eq!(ProviderKind::parse("local_wallet"), Some(ProviderKind::LocalWallet));
        assert_eq!(ProviderKind::parse("card"), Some(ProviderKind::Card));
        assert_eq!(ProviderKind::parse("crypto"), None);
    }
}
