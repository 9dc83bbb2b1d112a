// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use tillclose::backend::{Backend, http_client, parse_transactions};
use tillclose::commands::sync::{SyncReport, apply};
use tillclose::models::{
    Amount, CashSession, PaymentMethod, RawCashSession, RawTransaction, TxType,
};
use tillclose::db;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn raw(json: &str) -> Vec<RawTransaction> {
    serde_json::from_str(json).unwrap()
}

const DAY_JSON: &str = r#"[
    {"id": 71, "date": "2025-03-14T15:20:00", "type": "ingreso", "paymentMethod": "efectivo", "total": 35000, "description": "Corte + barba"},
    {"id": 72, "date": "2025-03-14", "type": "expense", "paymentMethod": "cash", "total": "4500.50"},
    {"id": 73, "date": "2025-03-14", "type": "income", "paymentMethod": "transfer", "total": 60000, "description": "  "}
]"#;

#[test]
fn wire_records_become_typed_transactions() {
    let parsed = parse_transactions(raw(DAY_JSON), day()).unwrap();
    assert_eq!(parsed.len(), 3);
    let first = &parsed[0].record;
    assert_eq!(first.remote_id, Some(71));
    assert_eq!(first.date, day());
    assert_eq!(first.kind, TxType::Income);
    assert_eq!(first.method, PaymentMethod::Cash);
    assert_eq!(first.total, Amount::from(35_000));
    assert_eq!(parsed[1].record.total.to_string(), "4500.5");
    assert_eq!(parsed[2].record.description, None);
}

#[test]
fn malformed_records_fail_the_batch() {
    let negative = raw(r#"[{"id": 1, "date": "2025-03-14", "type": "income", "paymentMethod": "cash", "total": -10}]"#);
    assert!(parse_transactions(negative, day()).is_err());

    let unknown = raw(r#"[{"id": 2, "date": "2025-03-14", "type": "income", "paymentMethod": "card", "total": 10}]"#);
    let err = parse_transactions(unknown, day()).unwrap_err();
    assert!(err.to_string().contains("transaction 2"));

    let other_day = raw(r#"[{"id": 3, "date": "2025-03-15", "type": "income", "paymentMethod": "cash", "total": 10}]"#);
    assert!(parse_transactions(other_day, day()).is_err());

    let missing_total: Result<Vec<RawTransaction>, _> =
        serde_json::from_str(r#"[{"id": 4, "date": "2025-03-14", "type": "income", "paymentMethod": "cash"}]"#);
    assert!(missing_total.is_err());
}

#[test]
fn sync_is_idempotent_and_mirrors_deletes() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();

    let batch = parse_transactions(raw(DAY_JSON), day()).unwrap();
    let first = apply(&conn, &batch).unwrap();
    assert_eq!(
        first,
        SyncReport { inserted: 3, updated: 0, deleted: 0, unchanged: 0 }
    );
    let again = apply(&conn, &batch).unwrap();
    assert_eq!(again.unchanged, 3);

    let changed = raw(r#"[
        {"id": 71, "date": "2025-03-14", "type": "income", "paymentMethod": "cash", "total": 36000, "description": "Corte + barba"},
        {"id": 72, "date": "2025-03-14", "type": "expense", "paymentMethod": "cash", "total": 4500.5, "deleted": true}
    ]"#);
    let report = apply(&conn, &parse_transactions(changed, day()).unwrap()).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.deleted, 1);

    let live = db::query_transactions(&conn, &db::TxFilter::default()).unwrap();
    assert_eq!(live.len(), 2);
}

#[test]
fn sync_leaves_closed_day_untouched() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO cash_sessions(date, opening_cash, cash_income, cash_expense, counted_cash)
         VALUES ('2025-03-14', '0', '0', '0', '0')",
        [],
    )
    .unwrap();
    let batch = parse_transactions(raw(DAY_JSON), day()).unwrap();
    assert!(apply(&conn, &batch).is_err());
    assert!(db::transactions_on(&conn, day()).unwrap().is_empty());
}

#[test]
fn session_records_are_validated() {
    let ok: RawCashSession = serde_json::from_str(
        r#"{"id": 9, "date": "2025-03-14", "openingCash": 100000, "cashIncome": 50000,
            "cashExpense": 10000, "transferTotal": 0, "countedCash": 139000,
            "note": "", "createdAt": "2025-03-14T22:01:00Z"}"#,
    )
    .unwrap();
    let s = CashSession::try_from(ok).unwrap();
    assert_eq!(s.note, None);
    assert_eq!(s.variance().to_string(), "-1000");

    let bad: RawCashSession = serde_json::from_str(
        r#"{"id": 10, "date": "2025-03-14", "openingCash": -1, "cashIncome": 0,
            "cashExpense": 0, "countedCash": 0}"#,
    )
    .unwrap();
    assert!(CashSession::try_from(bad).is_err());
}

#[test]
fn urls_join_without_double_slashes() {
    let b = Backend::new(http_client(5).unwrap(), "https://api.example.test/v1/");
    assert_eq!(b.url("transactions"), "https://api.example.test/v1/transactions");
    assert_eq!(b.url("/cash-sessions/3"), "https://api.example.test/v1/cash-sessions/3");
}
