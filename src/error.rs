// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Domain-level rejections. These are raised before anything reaches the
/// store or the backend.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(Decimal),

    #[error("Amount {value} is above the supported maximum of {max}")]
    AmountTooLarge { value: Decimal, max: Decimal },

    #[error("Invalid {field} '{value}'")]
    InvalidLabel { field: &'static str, value: String },

    #[error("Entry {id:?} is dated {found}, expected {expected}")]
    DateMismatch {
        id: Option<i64>,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error(
        "Variance of {variance} exceeds {threshold}; a justification note is required"
    )]
    MissingJustification { variance: Decimal, threshold: Decimal },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Ledger for {0} is closed; delete its cash session first")]
    LedgerClosed(NaiveDate),

    #[error("A cash session already exists for {0}")]
    SessionExists(NaiveDate),
}
