// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use crate::ledger::NewCashSession;
use crate::models::{
    Amount, CashSession, NewTransaction, PaymentMethod, RemoteTransaction, Transaction, TxType,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};

pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => crate::config::default_db_path()?,
    };
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        remote_id INTEGER UNIQUE,
        date TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        method TEXT NOT NULL CHECK(method IN ('cash','transfer')),
        total TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        deleted_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    -- expected cash and variance are derived on read, never stored
    CREATE TABLE IF NOT EXISTS cash_sessions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL UNIQUE,
        opening_cash TEXT NOT NULL,
        cash_income TEXT NOT NULL,
        cash_expense TEXT NOT NULL,
        transfer_total TEXT NOT NULL DEFAULT '0',
        counted_cash TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

const TX_COLUMNS: &str =
    "id, remote_id, date, kind, method, total, description, created_at, deleted_at";

fn tx_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        remote_id: r.get(1)?,
        date: r.get(2)?,
        kind: r.get(3)?,
        method: r.get(4)?,
        total: r.get(5)?,
        description: r.get(6)?,
        created_at: r.get(7)?,
        deleted_at: r.get(8)?,
    })
}

const SESSION_COLUMNS: &str = "id, date, opening_cash, cash_income, cash_expense, transfer_total, counted_cash, note, created_at";

fn session_from_row(r: &Row<'_>) -> rusqlite::Result<CashSession> {
    Ok(CashSession {
        id: r.get(0)?,
        date: r.get(1)?,
        opening_cash: r.get(2)?,
        cash_income: r.get(3)?,
        cash_expense: r.get(4)?,
        transfer_total: r.get(5)?,
        counted_cash: r.get(6)?,
        note: r.get(7)?,
        created_at: r.get(8)?,
    })
}

/// Rejects writes to a date whose ledger was already reconciled.
pub fn ensure_ledger_open(conn: &Connection, date: NaiveDate) -> Result<()> {
    if session_on(conn, date)?.is_some() {
        return Err(ValidationError::LedgerClosed(date).into());
    }
    Ok(())
}

pub fn insert_transaction(conn: &Connection, tx: &NewTransaction) -> Result<Transaction> {
    ensure_ledger_open(conn, tx.date)?;
    conn.execute(
        "INSERT INTO transactions(remote_id, date, kind, method, total, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.remote_id,
            tx.date,
            tx.kind,
            tx.method,
            tx.total,
            tx.description
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, date = %tx.date, kind = tx.kind.as_str(), total = %tx.total, "transaction recorded");
    get_transaction(conn, id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    conn.query_row(
        &format!("SELECT {} FROM transactions WHERE id=?1", TX_COLUMNS),
        params![id],
        tx_from_row,
    )
    .optional()?
    .ok_or_else(|| anyhow!("Transaction {} not found", id))
}

pub fn soft_delete_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let tx = get_transaction(conn, id)?;
    if tx.is_deleted() {
        return Err(anyhow!("Transaction {} is already deleted", id));
    }
    ensure_ledger_open(conn, tx.date)?;
    conn.execute(
        "UPDATE transactions SET deleted_at=datetime('now') WHERE id=?1",
        params![id],
    )?;
    info!(id, date = %tx.date, "transaction soft-deleted");
    get_transaction(conn, id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Inserted,
    Updated,
    Deleted,
    Unchanged,
}

/// Mirrors one backend transaction into the local ledger, keyed by its remote id.
pub fn upsert_remote_transaction(conn: &Connection, remote: &RemoteTransaction) -> Result<SyncOutcome> {
    let rec = &remote.record;
    let existing = match rec.remote_id {
        Some(rid) => conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE remote_id=?1", TX_COLUMNS),
                params![rid],
                tx_from_row,
            )
            .optional()?,
        None => None,
    };

    match existing {
        None if remote.deleted => Ok(SyncOutcome::Unchanged),
        None => {
            insert_transaction(conn, rec)?;
            Ok(SyncOutcome::Inserted)
        }
        Some(cur) if remote.deleted => {
            if cur.is_deleted() {
                return Ok(SyncOutcome::Unchanged);
            }
            soft_delete_transaction(conn, cur.id)?;
            Ok(SyncOutcome::Deleted)
        }
        Some(cur) => {
            let same = cur.date == rec.date
                && cur.kind == rec.kind
                && cur.method == rec.method
                && cur.total == rec.total
                && cur.description == rec.description
                && !cur.is_deleted();
            if same {
                return Ok(SyncOutcome::Unchanged);
            }
            ensure_ledger_open(conn, cur.date)?;
            ensure_ledger_open(conn, rec.date)?;
            conn.execute(
                "UPDATE transactions SET date=?1, kind=?2, method=?3, total=?4, description=?5, deleted_at=NULL
                 WHERE id=?6",
                params![rec.date, rec.kind, rec.method, rec.total, rec.description, cur.id],
            )?;
            debug!(id = cur.id, remote_id = ?rec.remote_id, "transaction updated from backend");
            Ok(SyncOutcome::Updated)
        }
    }
}

/// Every transaction dated `date`, soft-deleted ones included.
pub fn transactions_on(conn: &Connection, date: NaiveDate) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions WHERE date=?1 ORDER BY id",
        TX_COLUMNS
    ))?;
    let rows = stmt.query_map(params![date], tx_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[derive(Debug, Default)]
pub struct TxFilter {
    pub date: Option<NaiveDate>,
    pub month: Option<String>,
    pub kind: Option<TxType>,
    pub method: Option<PaymentMethod>,
    pub pattern: Option<Regex>,
    pub limit: Option<usize>,
    pub include_deleted: bool,
}

pub fn query_transactions(conn: &Connection, f: &TxFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", TX_COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(date) = f.date {
        sql.push_str(" AND date=?");
        params_vec.push(date.to_string());
    }
    if let Some(month) = &f.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.clone());
    }
    if let Some(kind) = f.kind {
        sql.push_str(" AND kind=?");
        params_vec.push(kind.as_str().into());
    }
    if let Some(method) = f.method {
        sql.push_str(" AND method=?");
        params_vec.push(method.as_str().into());
    }
    if !f.include_deleted {
        sql.push_str(" AND deleted_at IS NULL");
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), tx_from_row)?;

    let mut data = Vec::new();
    for row in rows {
        if f.limit.is_some_and(|l| data.len() >= l) {
            break;
        }
        let tx = row?;
        if let Some(re) = &f.pattern {
            if !re.is_match(tx.description.as_deref().unwrap_or("")) {
                continue;
            }
        }
        data.push(tx);
    }
    Ok(data)
}

pub fn insert_session(conn: &Connection, s: &NewCashSession) -> Result<CashSession> {
    if session_on(conn, s.date())?.is_some() {
        return Err(ValidationError::SessionExists(s.date()).into());
    }
    conn.execute(
        "INSERT INTO cash_sessions(date, opening_cash, cash_income, cash_expense, transfer_total, counted_cash, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            s.date(),
            s.opening_cash(),
            s.cash_income(),
            s.cash_expense(),
            s.transfer_total(),
            s.counted_cash(),
            s.note()
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, date = %s.date(), variance = %s.reconciliation().variance, "cash session closed");
    get_session(conn, id)
}

pub fn get_session(conn: &Connection, id: i64) -> Result<CashSession> {
    conn.query_row(
        &format!("SELECT {} FROM cash_sessions WHERE id=?1", SESSION_COLUMNS),
        params![id],
        session_from_row,
    )
    .optional()?
    .ok_or_else(|| anyhow!("Cash session {} not found", id))
}

pub fn session_on(conn: &Connection, date: NaiveDate) -> Result<Option<CashSession>> {
    let s = conn
        .query_row(
            &format!("SELECT {} FROM cash_sessions WHERE date=?1", SESSION_COLUMNS),
            params![date],
            session_from_row,
        )
        .optional()?;
    Ok(s)
}

pub fn list_sessions(conn: &Connection, month: Option<&str>) -> Result<Vec<CashSession>> {
    let mut out = Vec::new();
    match month {
        Some(m) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM cash_sessions WHERE substr(date,1,7)=?1 ORDER BY date DESC",
                SESSION_COLUMNS
            ))?;
            for row in stmt.query_map(params![m], session_from_row)? {
                out.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM cash_sessions ORDER BY date DESC",
                SESSION_COLUMNS
            ))?;
            for row in stmt.query_map([], session_from_row)? {
                out.push(row?);
            }
        }
    }
    Ok(out)
}

pub fn delete_session(conn: &Connection, id: i64) -> Result<CashSession> {
    let s = get_session(conn, id)?;
    conn.execute("DELETE FROM cash_sessions WHERE id=?1", params![id])?;
    info!(id, date = %s.date, "cash session deleted");
    Ok(s)
}

/// The previous session's counted cash carries over as the next opening cash.
pub fn opening_cash_for(conn: &Connection, date: NaiveDate) -> Result<Amount> {
    let prev: Option<Amount> = conn
        .query_row(
            "SELECT counted_cash FROM cash_sessions WHERE date<?1 ORDER BY date DESC LIMIT 1",
            params![date],
            |r| r.get(0),
        )
        .optional()?;
    Ok(prev.unwrap_or(Amount::ZERO))
}
