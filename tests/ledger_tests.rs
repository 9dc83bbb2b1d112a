// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tillclose::error::ValidationError;
use tillclose::ledger::{DayLedger, NewCashSession};
use tillclose::models::{Amount, PaymentMethod, Transaction, TxType};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn tx(id: i64, date: NaiveDate, kind: TxType, method: PaymentMethod, total: u32) -> Transaction {
    Transaction {
        id,
        remote_id: None,
        date,
        kind,
        method,
        total: Amount::from(total),
        description: None,
        created_at: "2025-03-14 18:00:00".into(),
        deleted_at: None,
    }
}

fn sample_day() -> Vec<Transaction> {
    vec![
        tx(1, day(14), TxType::Income, PaymentMethod::Cash, 30_000),
        tx(2, day(14), TxType::Income, PaymentMethod::Cash, 20_000),
        tx(3, day(14), TxType::Expense, PaymentMethod::Cash, 10_000),
        tx(4, day(14), TxType::Income, PaymentMethod::Transfer, 45_000),
        tx(5, day(14), TxType::Expense, PaymentMethod::Transfer, 5_000),
    ]
}

#[test]
fn summary_partitions_by_type_and_method() {
    let ledger = DayLedger::seal(day(14), sample_day()).unwrap();
    let s = ledger.summary();
    assert_eq!(s.entries, 5);
    assert_eq!(s.cash_income, Decimal::from(50_000));
    assert_eq!(s.cash_expense, Decimal::from(10_000));
    assert_eq!(s.transfer_income, Decimal::from(45_000));
    assert_eq!(s.transfer_expense, Decimal::from(5_000));
    assert_eq!(s.transfer_total, Decimal::from(50_000));
}

#[test]
fn soft_deleted_entries_are_ignored() {
    let mut entries = sample_day();
    entries[0].deleted_at = Some("2025-03-14 19:00:00".into());
    let ledger = DayLedger::seal(day(14), entries).unwrap();
    assert_eq!(ledger.entries().len(), 4);
    assert_eq!(ledger.summary().cash_income, Decimal::from(20_000));
}

#[test]
fn foreign_dated_entry_is_rejected() {
    let mut entries = sample_day();
    entries.push(tx(9, day(15), TxType::Income, PaymentMethod::Cash, 1));
    let err = DayLedger::seal(day(14), entries).unwrap_err();
    assert_eq!(
        err,
        ValidationError::DateMismatch {
            id: Some(9),
            expected: day(14),
            found: day(15),
        }
    );
}

#[test]
fn empty_day_summarises_to_zero() {
    let s = DayLedger::seal(day(1), Vec::new()).unwrap().summary();
    assert_eq!(s.entries, 0);
    assert!(s.cash_income.is_zero() && s.cash_expense.is_zero() && s.transfer_total.is_zero());
}

#[test]
fn close_uses_cash_totals_only() {
    let ledger = DayLedger::seal(day(14), sample_day()).unwrap();
    let s = NewCashSession::close(&ledger, Amount::from(100_000), Amount::from(140_000), None)
        .unwrap();
    let r = s.reconciliation();
    assert_eq!(r.expected_cash, Decimal::from(140_000));
    assert!(r.variance.is_zero());
    assert_eq!(s.transfer_total(), Amount::from(50_000));
    assert_eq!(s.note(), None);
}

#[test]
fn close_refuses_unexplained_variance() {
    let ledger = DayLedger::seal(day(14), sample_day()).unwrap();
    let err = NewCashSession::close(&ledger, Amount::ZERO, Amount::from(100_000), Some("   "))
        .unwrap_err();
    assert!(matches!(err, ValidationError::MissingJustification { .. }));

    let ok = NewCashSession::close(
        &ledger,
        Amount::ZERO,
        Amount::from(100_000),
        Some("  float from yesterday not recorded "),
    )
    .unwrap();
    assert_eq!(ok.note(), Some("float from yesterday not recorded"));
    assert_eq!(ok.reconciliation().variance, Decimal::from(60_000));
}

#[test]
fn oversized_day_total_is_rejected_not_overflowed() {
    let top = Amount::new(Amount::upper_bound()).unwrap();
    let entries: Vec<Transaction> = (1..=3)
        .map(|id| {
            let mut t = tx(id, day(14), TxType::Income, PaymentMethod::Cash, 0);
            t.total = top;
            t
        })
        .collect();
    let ledger = DayLedger::seal(day(14), entries).unwrap();
    assert_eq!(ledger.summary().cash_income, Amount::upper_bound() * Decimal::from(3));

    let err = NewCashSession::close(&ledger, top, Amount::ZERO, Some("audit")).unwrap_err();
    assert!(matches!(err, ValidationError::AmountTooLarge { .. }));
}
