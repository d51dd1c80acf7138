//! Billing domain - due subscriptions, sweep modes and summaries.

mod events;
mod subscription;
mod sweep;

pub use events::BillingReminderDue;
pub use subscription::{
    PaymentMethod, PaymentMethodStatus, ProviderCatalogEntry, ShippingWindow, Subscription,
};
pub use sweep::{
    kind_label, BillingCounts, BillingRoute, BillingSummary, BillingSweepError, BillingWindow,
    RunMode, SweepStep,
};
