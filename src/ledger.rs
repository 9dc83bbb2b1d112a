// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use crate::models::{Amount, PaymentMethod, Transaction, TxType};
use crate::reconcile::{self, CashCount, Reconciliation};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// The closed set of one day's live transactions. Soft-deleted entries are
/// dropped on sealing; entries from any other date are rejected.
#[derive(Debug, Clone)]
pub struct DayLedger {
    date: NaiveDate,
    entries: Vec<Transaction>,
}

impl DayLedger {
    pub fn seal(date: NaiveDate, entries: Vec<Transaction>) -> Result<Self, ValidationError> {
        if let Some(stray) = entries.iter().find(|t| t.date != date) {
            return Err(ValidationError::DateMismatch {
                id: Some(stray.id),
                expected: date,
                found: stray.date,
            });
        }
        let entries = entries.into_iter().filter(|t| !t.is_deleted()).collect();
        Ok(DayLedger { date, entries })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn summary(&self) -> DaySummary {
        let mut s = DaySummary {
            date: self.date,
            entries: self.entries.len(),
            cash_income: Decimal::ZERO,
            cash_expense: Decimal::ZERO,
            transfer_income: Decimal::ZERO,
            transfer_expense: Decimal::ZERO,
            transfer_total: Decimal::ZERO,
        };
        for t in &self.entries {
            let slot = match (t.kind, t.method) {
                (TxType::Income, PaymentMethod::Cash) => &mut s.cash_income,
                (TxType::Expense, PaymentMethod::Cash) => &mut s.cash_expense,
                (TxType::Income, PaymentMethod::Transfer) => &mut s.transfer_income,
                (TxType::Expense, PaymentMethod::Transfer) => &mut s.transfer_expense,
            };
            *slot = slot.saturating_add(t.total.value());
        }
        s.transfer_total = s.transfer_income.saturating_add(s.transfer_expense);
        s
    }
}

/// Per-day totals partitioned by type and payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub entries: usize,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub cash_income: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub cash_expense: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub transfer_income: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub transfer_expense: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub transfer_total: Decimal,
}

/// A cash session that passed reconciliation and may be stored or submitted.
/// The only way to build one is [`NewCashSession::close`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCashSession {
    date: NaiveDate,
    opening_cash: Amount,
    cash_income: Amount,
    cash_expense: Amount,
    transfer_total: Amount,
    counted_cash: Amount,
    note: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    expected_cash: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    variance: Decimal,
}

impl NewCashSession {
    pub fn close(
        ledger: &DayLedger,
        opening_cash: Amount,
        counted_cash: Amount,
        note: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let summary = ledger.summary();
        // Totals above the amount bound are rejected here, before any arithmetic.
        let count = CashCount {
            opening_cash,
            cash_income: Amount::new(summary.cash_income)?,
            cash_expense: Amount::new(summary.cash_expense)?,
            counted_cash,
        };
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let r = reconcile::reconcile(&count, note.unwrap_or(""));
        r.ensure_valid()?;
        Ok(NewCashSession {
            date: ledger.date(),
            opening_cash,
            cash_income: count.cash_income,
            cash_expense: count.cash_expense,
            transfer_total: Amount::new(summary.transfer_total)?,
            counted_cash,
            note: note.map(str::to_string),
            expected_cash: r.expected_cash,
            variance: r.variance,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn opening_cash(&self) -> Amount {
        self.opening_cash
    }

    pub fn cash_income(&self) -> Amount {
        self.cash_income
    }

    pub fn cash_expense(&self) -> Amount {
        self.cash_expense
    }

    pub fn transfer_total(&self) -> Amount {
        self.transfer_total
    }

    pub fn counted_cash(&self) -> Amount {
        self.counted_cash
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn reconciliation(&self) -> Reconciliation {
        let count = CashCount {
            opening_cash: self.opening_cash,
            cash_income: self.cash_income,
            cash_expense: self.cash_expense,
            counted_cash: self.counted_cash,
        };
        reconcile::reconcile(&count, self.note.as_deref().unwrap_or(""))
    }
}
