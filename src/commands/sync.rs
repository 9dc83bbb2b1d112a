// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::Backend;
use crate::config::Settings;
use crate::db::{self, SyncOutcome};
use crate::models::RemoteTransaction;
use crate::utils::{parse_date, required};
use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// Applies an already validated batch inside one SQLite transaction, so a
/// rejected record leaves the local ledger untouched.
pub fn apply(conn: &Connection, batch: &[RemoteTransaction]) -> Result<SyncReport> {
    let sp = conn.unchecked_transaction()?;
    let mut report = SyncReport::default();
    for remote in batch {
        match db::upsert_remote_transaction(&sp, remote)? {
            SyncOutcome::Inserted => report.inserted += 1,
            SyncOutcome::Updated => report.updated += 1,
            SyncOutcome::Deleted => report.deleted += 1,
            SyncOutcome::Unchanged => report.unchanged += 1,
        }
    }
    sp.commit()?;
    Ok(report)
}

pub fn handle(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(required(sub, "date")?)?;
    db::ensure_ledger_open(conn, date)?;
    let backend = Backend::from_settings(settings)?;
    let batch = backend.day_transactions(date)?;
    let report = apply(conn, &batch)?;
    info!(%date, ?report, "sync finished");
    println!(
        "Synced {}: {} new, {} updated, {} deleted, {} unchanged",
        date, report.inserted, report.updated, report.deleted, report.unchanged
    );
    Ok(())
}
