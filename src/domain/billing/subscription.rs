//! Read models the billing sweep works from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AddressId, DeliveryWindowId, PaymentMethodId, SubscriptionId, UserId,
};
use crate::domain::payment::ProviderKind;

/// Where a subscription's boxes are delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingWindow {
    pub address_id: Option<AddressId>,
    pub delivery_window_id: Option<DeliveryWindowId>,
}

/// A recurring order the sweep may bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub next_invoice_date: NaiveDate,
    pub default_method_id: Option<PaymentMethodId>,
    pub shipping_window: Option<ShippingWindow>,
}

impl Subscription {
    /// Address to deliver to, or the unset address when none is recorded.
    pub fn address_id(&self) -> AddressId {
        self.shipping_window
            .as_ref()
            .and_then(|w| w.address_id)
            .unwrap_or_else(AddressId::unset)
    }

    /// Delivery slot, or the unset window when none is recorded.
    pub fn delivery_window_id(&self) -> DeliveryWindowId {
        self.shipping_window
            .as_ref()
            .and_then(|w| w.delivery_window_id)
            .unwrap_or_else(DeliveryWindowId::unset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodStatus {
    Active,
    Inactive,
}

/// A user's saved means of payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub user_id: UserId,
    /// Provider identifier as stored; may name a rail with no adapter.
    pub provider_id: String,
    pub status: PaymentMethodStatus,
}

impl PaymentMethod {
    pub fn is_active(&self) -> bool {
        self.status == PaymentMethodStatus::Active
    }
}

/// Provider catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCatalogEntry {
    pub id: String,
    /// `None` when the catalog holds a kind this engine does not know.
    pub kind: Option<ProviderKind>,
}
