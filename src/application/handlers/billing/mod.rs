//! Billing command handlers.

mod run_billing_sweep;

pub use run_billing_sweep::{RunBillingSweepCommand, RunBillingSweepHandler, SweepSettings};
