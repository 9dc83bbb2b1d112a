// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! End-of-day cash reconciliation.
//!
//! `expected = opening + cash income - cash expense`, `variance = counted - expected`.
//! A variance whose magnitude is strictly above [`JUSTIFICATION_THRESHOLD`]
//! needs a non-blank note before the session can be submitted.

use crate::error::ValidationError;
use crate::models::Amount;
use rust_decimal::Decimal;
use serde::Serialize;

/// Variance magnitude (in whole currency units) above which a note is mandatory.
pub const JUSTIFICATION_THRESHOLD: i64 = 20_000;

/// [`JUSTIFICATION_THRESHOLD`] as a money value, for comparisons and messages.
pub fn justification_threshold() -> Decimal {
    Decimal::from(JUSTIFICATION_THRESHOLD)
}

/// The four cash figures a session is reconciled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CashCount {
    pub opening_cash: Amount,
    pub cash_income: Amount,
    pub cash_expense: Amount,
    pub counted_cash: Amount,
}

// Amounts are bounded, so these sums stay far inside `Decimal` range.
impl CashCount {
    pub fn expected_cash(&self) -> Decimal {
        self.opening_cash.value() + self.cash_income.value() - self.cash_expense.value()
    }

    pub fn variance(&self) -> Decimal {
        self.counted_cash.value() - self.expected_cash()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceKind {
    Exact,
    Surplus,
    Shortage,
}

impl VarianceKind {
    pub fn of(variance: Decimal) -> Self {
        if variance.is_zero() {
            VarianceKind::Exact
        } else if variance.is_sign_positive() {
            VarianceKind::Surplus
        } else {
            VarianceKind::Shortage
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VarianceKind::Exact => "exact",
            VarianceKind::Surplus => "surplus",
            VarianceKind::Shortage => "shortage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub expected_cash: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub variance: Decimal,
    pub kind: VarianceKind,
    pub requires_justification: bool,
    pub is_valid: bool,
}

impl Reconciliation {
    pub fn ensure_valid(&self) -> Result<(), ValidationError> {
        if self.is_valid {
            return Ok(());
        }
        Err(ValidationError::MissingJustification {
            variance: self.variance,
            threshold: justification_threshold(),
        })
    }
}

pub fn requires_justification(variance: Decimal) -> bool {
    variance.abs() > justification_threshold()
}

pub fn reconcile(count: &CashCount, note: &str) -> Reconciliation {
    let expected_cash = count.expected_cash();
    let variance = count.counted_cash.value() - expected_cash;
    let requires_justification = requires_justification(variance);
    Reconciliation {
        expected_cash,
        variance,
        kind: VarianceKind::of(variance),
        requires_justification,
        is_valid: !requires_justification || !note.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(opening: u32, income: u32, expense: u32, counted: u32) -> CashCount {
        CashCount {
            opening_cash: opening.into(),
            cash_income: income.into(),
            cash_expense: expense.into(),
            counted_cash: counted.into(),
        }
    }

    #[test]
    fn zero_variance_is_exact() {
        assert_eq!(VarianceKind::of(Decimal::ZERO), VarianceKind::Exact);
        assert_eq!(VarianceKind::of(Decimal::new(1, 2)), VarianceKind::Surplus);
        assert_eq!(VarianceKind::of(Decimal::new(-1, 2)), VarianceKind::Shortage);
    }

    #[test]
    fn expected_can_go_below_zero() {
        let r = reconcile(&count(0, 0, 5_000, 0), "");
        assert_eq!(r.expected_cash, Decimal::from(-5_000));
        assert_eq!(r.variance, Decimal::from(5_000));
        assert!(r.is_valid);
    }

    #[test]
    fn ensure_valid_reports_threshold() {
        let r = reconcile(&count(0, 0, 0, 25_000), "  ");
        match r.ensure_valid() {
            Err(ValidationError::MissingJustification { variance, threshold }) => {
                assert_eq!(variance, Decimal::from(25_000));
                assert_eq!(threshold, Decimal::from(20_000));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
