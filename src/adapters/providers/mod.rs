//! Provider adapters - one per payment rail, selected through a registry.
//!
//! | Provider | Adapter | Network |
//! |----------|---------|---------|
//! | telebirr | `TelebirrAdapter` | placeholder checkout |
//! | chapa | `ChapaAdapter` | hosted checkout initialize |
//! | arifpay | `ArifpayAdapter` | placeholder checkout |
//! | cod | `CashOnDeliveryAdapter` | none |

mod arifpay;
mod chapa;
mod cod;
mod telebirr;

pub use arifpay::{ArifpayAdapter, ArifpayConfig};
pub use chapa::{
    build_initialize_request, parse_initialize_response, ChapaAdapter, ChapaConfig,
    InitializeRequest,
};
pub use cod::CashOnDeliveryAdapter;
pub use telebirr::{TelebirrAdapter, TelebirrConfig};

pub use crate::ports::ProviderRegistry;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::ProviderId;
    use std::sync::Arc;

    #[test]
    fn registry_keys_adapters_by_their_provider() {
        let registry = ProviderRegistry::new().with(Arc::new(CashOnDeliveryAdapter));

        assert!(registry.get(ProviderId::Cod).is_some());
        assert!(registry.get(ProviderId::Chapa).is_none());
        assert_eq!(registry.providers(), vec![ProviderId::Cod]);
    }
}
