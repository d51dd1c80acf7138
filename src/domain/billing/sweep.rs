//! Billing sweep vocabulary: run mode, due window, summary and failures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{Timestamp, ValidationError};
use crate::domain::payment::ProviderKind;

/// Whether a sweep only reports or actually acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Dry,
    Live,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Dry => "dry",
            RunMode::Live => "live",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, RunMode::Live)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry" => Ok(RunMode::Dry),
            "live" => Ok(RunMode::Live),
            other => Err(ValidationError::invalid_format(
                "run_mode",
                format!("expected 'dry' or 'live', got '{}'", other),
            )),
        }
    }
}

/// Inclusive range of invoice dates a sweep considers due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl BillingWindow {
    /// `[now, now + lookahead_days]` as calendar dates.
    pub fn starting_at(now: Timestamp, lookahead_days: u32) -> Self {
        Self {
            from: now.date(),
            to: now.plus_days(i64::from(lookahead_days)).date(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// How a due subscription gets billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingRoute {
    /// Charged unattended through the orchestrator.
    Card,
    /// Wallets, cash and anything unresolved: the user is reminded instead.
    LocalOrCod,
}

impl BillingRoute {
    pub fn for_kind(kind: Option<ProviderKind>) -> Self {
        match kind {
            Some(ProviderKind::Card) => BillingRoute::Card,
            _ => BillingRoute::LocalOrCod,
        }
    }
}

/// Label used in notes and reminder events for a resolved (or missing) kind.
pub fn kind_label(kind: Option<ProviderKind>) -> &'static str {
    kind.map(|k| k.as_str()).unwrap_or("unknown")
}

/// The base-table read a sweep was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStep {
    FetchSubs,
    FetchPaymentMethods,
    FetchProviders,
}

impl SweepStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepStep::FetchSubs => "fetch_subs",
            SweepStep::FetchPaymentMethods => "fetch_payment_methods",
            SweepStep::FetchProviders => "fetch_providers",
        }
    }
}

impl fmt::Display for SweepStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that aborts the whole sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("billing sweep failed at {step}: {message}")]
pub struct BillingSweepError {
    pub step: SweepStep,
    pub message: String,
}

impl BillingSweepError {
    pub fn new(step: SweepStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCounts {
    pub total: usize,
    pub card: usize,
    pub local_or_cod: usize,
}

/// What a sweep saw and did. This is the sweep's whole external contract
/// besides the intents and reminders it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub ok: bool,
    pub mode: RunMode,
    pub timezone: String,
    pub lookahead_days: u32,
    pub window: BillingWindow,
    /// Subscriptions returned by the due query.
    pub fetched: usize,
    /// Page bound applied to the due query.
    pub page_limit: u32,
    pub counts: BillingCounts,
    pub acted_on: usize,
    pub notes: Vec<String>,
}

impl BillingSummary {
    pub fn new(
        mode: RunMode,
        timezone: impl Into<String>,
        lookahead_days: u32,
        window: BillingWindow,
        page_limit: u32,
    ) -> Self {
        Self {
            ok: true,
            mode,
            timezone: timezone.into(),
            lookahead_days,
            window,
            fetched: 0,
            page_limit,
            counts: BillingCounts::default(),
            acted_on: 0,
            notes: Vec::new(),
        }
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Counts one subscription under its route.
    pub fn count(&mut self, route: BillingRoute) {
        self.counts.total += 1;
        match route {
            BillingRoute::Card => self.counts.card += 1,
            BillingRoute::LocalOrCod => self.counts.local_or_cod += 1,
        }
    }

    /// True when the due query returned a full page and more may be waiting.
    pub fn is_truncated(&self) -> bool {
        self.page_limit > 0 && self.fetched >= self.page_limit as usize
    }
}
