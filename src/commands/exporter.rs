// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::sessions::SessionReport;
use crate::db::{self, TxFilter};
use crate::utils::required;
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("sessions", sub)) => export_sessions(conn, sub),
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn format_of(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = required(sub, "format")?.trim().to_lowercase();
    match fmt.as_str() {
        "csv" | "json" => Ok(fmt),
        _ => Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
}

fn export_sessions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = required(sub, "out")?;
    let sessions = db::list_sessions(conn, None)?;
    let reports: Vec<SessionReport<'_>> = sessions.iter().map(SessionReport::from).collect();

    if fmt == "json" {
        std::fs::write(out, serde_json::to_string_pretty(&reports)?)?;
    } else {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "id",
            "date",
            "opening_cash",
            "cash_income",
            "cash_expense",
            "expected_cash",
            "counted_cash",
            "variance",
            "kind",
            "transfer_total",
            "note",
            "created_at",
        ])?;
        for r in &reports {
            let s = r.session;
            wtr.write_record([
                s.id.to_string(),
                s.date.to_string(),
                s.opening_cash.to_string(),
                s.cash_income.to_string(),
                s.cash_expense.to_string(),
                r.reconciliation.expected_cash.to_string(),
                s.counted_cash.to_string(),
                r.reconciliation.variance.to_string(),
                r.reconciliation.kind.label().to_string(),
                s.transfer_total.to_string(),
                s.note.clone().unwrap_or_default(),
                s.created_at.clone(),
            ])?;
        }
        wtr.flush()?;
    }
    println!("Exported {} cash sessions to {}", reports.len(), out);
    Ok(())
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = required(sub, "out")?;
    let mut rows = db::query_transactions(conn, &TxFilter::default())?;
    rows.reverse();

    if fmt == "json" {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    } else {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(["id", "date", "type", "method", "total", "description"])?;
        for t in &rows {
            wtr.write_record([
                t.id.to_string(),
                t.date.to_string(),
                t.kind.as_str().to_string(),
                t.method.as_str().to_string(),
                t.total.to_string(),
                t.description.clone().unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
