//! Per-provider webhook vocabulary.
//!
//! Each provider signs with its own header and encoding, puts the intent
//! reference and transaction id in different places, and reports status in
//! its own words. A `WebhookProfile` captures all of that as data so the
//! reconciler runs one code path for every provider.

use serde_json::Value as JsonValue;

use super::{IntentStatus, ProviderId, SignatureEncoding};

/// Static description of how one provider's callbacks look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookProfile {
    pub provider: ProviderId,
    /// Header names carrying the signature, first match wins.
    pub signature_headers: &'static [&'static str],
    pub encoding: SignatureEncoding,
    /// JSON pointers to the intent reference, in priority order.
    pub intent_paths: &'static [&'static str],
    /// JSON pointers to the provider transaction id, in priority order.
    pub txn_id_paths: &'static [&'static str],
    /// JSON pointers to the status value, in priority order.
    pub status_paths: &'static [&'static str],
    /// Documented status values. Anything else reconciles as failed.
    pub statuses: &'static [(&'static str, IntentStatus)],
}

const TELEBIRR: WebhookProfile = WebhookProfile {
    provider: ProviderId::Telebirr,
    signature_headers: &["x-telebirr-signature"],
    encoding: SignatureEncoding::Base64,
    intent_paths: &["/meta/intent_id", "/reference"],
    txn_id_paths: &["/txn_id"],
    status_paths: &["/status"],
    statuses: &[
        ("SUCCESS", IntentStatus::Succeeded),
        ("PENDING", IntentStatus::Pending),
        ("FAILED", IntentStatus::Failed),
        ("CANCELLED", IntentStatus::Failed),
        ("EXPIRED", IntentStatus::Failed),
    ],
};

const CHAPA: WebhookProfile = WebhookProfile {
    provider: ProviderId::Chapa,
    signature_headers: &["chapa-signature", "x-chapa-signature"],
    encoding: SignatureEncoding::Hex,
    intent_paths: &["/meta/intent_id", "/data/intent_id", "/tx_ref"],
    txn_id_paths: &["/data/transaction_id", "/transaction_id"],
    status_paths: &["/status", "/data/status"],
    statuses: &[
        ("success", IntentStatus::Succeeded),
        ("SUCCESS", IntentStatus::Succeeded),
        ("pending", IntentStatus::Pending),
        ("failed", IntentStatus::Failed),
        ("cancelled", IntentStatus::Failed),
    ],
};

const ARIFPAY: WebhookProfile = WebhookProfile {
    provider: ProviderId::Arifpay,
    signature_headers: &["x-arifpay-signature"],
    encoding: SignatureEncoding::Hex,
    intent_paths: &["/meta/intent_id", "/reference", "/tx_ref"],
    txn_id_paths: &["/txn_id", "/data/transaction_id"],
    status_paths: &["/status"],
    statuses: &[
        ("SUCCESS", IntentStatus::Succeeded),
        ("success", IntentStatus::Succeeded),
        ("PENDING", IntentStatus::Pending),
        ("pending", IntentStatus::Pending),
        ("FAILED", IntentStatus::Failed),
        ("failed", IntentStatus::Failed),
        ("CANCELLED", IntentStatus::Failed),
        ("EXPIRED", IntentStatus::Failed),
    ],
};

impl WebhookProfile {
    /// The profile for a provider that sends callbacks. Cash on delivery
    /// has none.
    pub fn for_provider(provider: ProviderId) -> Option<&'static WebhookProfile> {
        match provider {
            ProviderId::Telebirr => Some(&TELEBIRR),
            ProviderId::Chapa => Some(&CHAPA),
            ProviderId::Arifpay => Some(&ARIFPAY),
            ProviderId::Cod => None,
        }
    }

    /// The intent reference from the first populated location.
    pub fn intent_reference(&self, payload: &JsonValue) -> Option<String> {
        first_text(payload, self.intent_paths)
    }

    /// The provider transaction id from the first populated location.
    pub fn provider_txn_id(&self, payload: &JsonValue) -> Option<String> {
        first_text(payload, self.txn_id_paths)
    }

    /// Canonical status for a callback. Missing or undocumented values
    /// reconcile as failed.
    pub fn status_of(&self, payload: &JsonValue) -> IntentStatus {
        first_text(payload, self.status_paths)
            .map(|raw| self.map_status(&raw))
            .unwrap_or(IntentStatus::Failed)
    }

    /// Maps one raw provider status value.
    pub fn map_status(&self, raw: &str) -> IntentStatus {
        self.statuses
            .iter()
            .find(|(value, _)| *value == raw)
            .map(|(_, status)| *status)
            .unwrap_or(IntentStatus::Failed)
    }
}

/// First non-blank string (or number, rendered) at any of `paths`.
fn first_text(payload: &JsonValue, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match payload.pointer(path)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn profile(provider: ProviderId) -> &'static WebhookProfile {
        WebhookProfile::for_provider(provider).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Profile lookup
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn every_remote_provider_has_a_profile() {
        for provider in [ProviderId::Telebirr, ProviderId::Chapa, ProviderId::Arifpay] {
            assert_eq!(profile(provider).provider, provider);
        }
        assert!(WebhookProfile::for_provider(ProviderId::Cod).is_none());
    }

    #[test]
    fn encodings_are_declared_per_provider() {
        assert_eq!(profile(ProviderId::Telebirr).encoding, SignatureEncoding::Base64);
        assert_eq!(profile(ProviderId::Chapa).encoding, SignatureEncoding::Hex);
        assert_eq!(profile(ProviderId::Arifpay).encoding, SignatureEncoding::Hex);
    }

    // ══════════════════════════════════════════════════════════════
    // Intent reference priority
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn metadata_wins_over_reference() {
        let payload = json!({"meta": {"intent_id": "from-meta"}, "reference": "from-ref"});
        assert_eq!(
            profile(ProviderId::Telebirr).intent_reference(&payload).as_deref(),
            Some("from-meta")
        );
    }

    #[test]
    fn chapa_falls_back_to_data_then_tx_ref() {
        let p = profile(ProviderId::Chapa);
        assert_eq!(
            p.intent_reference(&json!({"data": {"intent_id": "d"}, "tx_ref": "t"}))
                .as_deref(),
            Some("d")
        );
        assert_eq!(p.intent_reference(&json!({"tx_ref": "t"})).as_deref(), Some("t"));
    }

    #[test]
    fn arifpay_falls_back_through_reference_and_tx_ref() {
        let p = profile(ProviderId::Arifpay);
        assert_eq!(p.intent_reference(&json!({"reference": "r"})).as_deref(), Some("r"));
        assert_eq!(p.intent_reference(&json!({"tx_ref": "t"})).as_deref(), Some("t"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let payload = json!({"meta": {"intent_id": "  "}, "reference": "abc"});
        assert_eq!(
            profile(ProviderId::Telebirr).intent_reference(&payload).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn missing_reference_resolves_to_none() {
        assert!(profile(ProviderId::Telebirr)
            .intent_reference(&json!({"status": "SUCCESS"}))
            .is_none());
    }

    #[test]
    fn transaction_id_priority() {
        let p = profile(ProviderId::Chapa);
        let payload = json!({"data": {"transaction_id": "inner"}, "transaction_id": "outer"});
        assert_eq!(p.provider_txn_id(&payload).as_deref(), Some("inner"));

        let p = profile(ProviderId::Arifpay);
        assert_eq!(
            p.provider_txn_id(&json!({"data": {"transaction_id": 42}})).as_deref(),
            Some("42")
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Status mapping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn telebirr_status_table_is_case_sensitive() {
        let p = profile(ProviderId::Telebirr);
        assert_eq!(p.map_status("SUCCESS"), IntentStatus::Succeeded);
        assert_eq!(p.map_status("PENDING"), IntentStatus::Pending);
        assert_eq!(p.map_status("success"), IntentStatus::Failed);
    }

    #[test]
    fn chapa_accepts_both_success_spellings() {
        let p = profile(ProviderId::Chapa);
        assert_eq!(p.map_status("success"), IntentStatus::Succeeded);
        assert_eq!(p.map_status("SUCCESS"), IntentStatus::Succeeded);
        assert_eq!(p.map_status("pending"), IntentStatus::Pending);
    }

    #[test]
    fn missing_status_is_failed() {
        assert_eq!(
            profile(ProviderId::Arifpay).status_of(&json!({"reference": "x"})),
            IntentStatus::Failed
        );
    }

    #[test]
    fn documented_values_map_to_exactly_one_status() {
        for provider in [ProviderId::Telebirr, ProviderId::Chapa, ProviderId::Arifpay] {
            let p = profile(provider);
            for (raw, expected) in p.statuses {
                let matches: Vec<_> = p.statuses.iter().filter(|(v, _)| v == raw).collect();
                assert_eq!(matches.len(), 1, "{} lists {} twice", provider, raw);
                assert_eq!(p.map_status(raw), *expected);
                assert_ne!(*expected, IntentStatus::Created);
            }
        }
    }

    proptest! {
        #[test]
        fn undocumented_values_map_to_failed(raw in "[A-Za-z_]{0,12}") {
            for provider in [ProviderId::Telebirr, ProviderId::Chapa, ProviderId::Arifpay] {
                let p = profile(provider);
                let documented = p.statuses.iter().any(|(v, _)| *v == raw);
                if !documented {
                    prop_assert_eq!(p.map_status(&raw), IntentStatus::Failed);
                }
            }
        }
    }
}
