// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backend::Backend;
use crate::config::Settings;
use crate::db;
use crate::error::ValidationError;
use crate::ledger::{DayLedger, DaySummary, NewCashSession};
use crate::models::{Amount, CashSession};
use crate::reconcile::{self, CashCount, Reconciliation};
use crate::utils::{
    fmt_money, maybe_print_json, parse_amount, parse_date, parse_id, parse_month, pretty_table,
    required,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("preview", sub)) => preview(conn, settings, sub)?,
        Some(("close", sub)) => {
            let session = close(conn, settings, sub)?;
            print_session(settings, &session);
        }
        Some(("list", sub)) => list(conn, settings, sub)?,
        Some(("show", sub)) => {
            let s = db::get_session(conn, parse_id(required(sub, "id")?)?)?;
            if !maybe_print_json(sub.get_flag("json"), false, &SessionReport::from(&s))? {
                print_session(settings, &s);
            }
        }
        Some(("rm", sub)) if sub.get_flag("remote") => {
            let id = parse_id(required(sub, "id")?)?;
            Backend::from_settings(settings)?.delete_session(id)?;
            info!(remote_id = id, "backend cash session deleted");
            println!("Deleted backend cash session {}", id);
        }
        Some(("rm", sub)) => {
            let s = db::delete_session(conn, parse_id(required(sub, "id")?)?)?;
            println!("Deleted cash session {} ({}); its ledger is open again", s.id, s.date);
        }
        _ => {}
    }
    Ok(())
}

/// Stored session plus its derived figures, for JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport<'a> {
    #[serde(flatten)]
    pub session: &'a CashSession,
    #[serde(flatten)]
    pub reconciliation: Reconciliation,
}

impl<'a> From<&'a CashSession> for SessionReport<'a> {
    fn from(session: &'a CashSession) -> Self {
        SessionReport {
            session,
            reconciliation: session.reconciliation(),
        }
    }
}

/// The draft a close would produce, before the justification gate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub summary: DaySummary,
    pub opening_cash: Amount,
    pub counted_cash: Amount,
    pub note: Option<String>,
    pub reconciliation: Reconciliation,
}

struct CloseArgs<'a> {
    date: NaiveDate,
    counted: Amount,
    opening: Option<Amount>,
    note: Option<&'a str>,
}

fn close_args(sub: &clap::ArgMatches) -> Result<CloseArgs<'_>> {
    Ok(CloseArgs {
        date: parse_date(required(sub, "date")?)?,
        counted: parse_amount(required(sub, "counted")?)?,
        opening: sub
            .get_one::<String>("opening")
            .map(|o| parse_amount(o))
            .transpose()?,
        note: sub.get_one::<String>("note").map(String::as_str),
    })
}

fn sealed_ledger(conn: &Connection, date: NaiveDate) -> Result<DayLedger> {
    Ok(DayLedger::seal(date, db::transactions_on(conn, date)?)?)
}

pub fn draft(conn: &Connection, sub: &clap::ArgMatches) -> Result<Draft> {
    let args = close_args(sub)?;
    let ledger = sealed_ledger(conn, args.date)?;
    let summary = ledger.summary();
    let opening_cash = match args.opening {
        Some(o) => o,
        None => db::opening_cash_for(conn, args.date)?,
    };
    let note = args.note.map(str::trim).filter(|n| !n.is_empty());
    let count = CashCount {
        opening_cash,
        cash_income: Amount::new(summary.cash_income)?,
        cash_expense: Amount::new(summary.cash_expense)?,
        counted_cash: args.counted,
    };
    Ok(Draft {
        reconciliation: reconcile::reconcile(&count, note.unwrap_or("")),
        summary,
        opening_cash,
        counted_cash: args.counted,
        note: note.map(str::to_string),
    })
}

fn preview(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let d = draft(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), false, &d)? {
        return Ok(());
    }
    let ccy = &settings.currency;
    let mut rows = reconciliation_rows(
        ccy,
        d.summary.date,
        CashCount {
            opening_cash: d.opening_cash,
            cash_income: Amount::new(d.summary.cash_income)?,
            cash_expense: Amount::new(d.summary.cash_expense)?,
            counted_cash: d.counted_cash,
        },
        d.summary.transfer_total,
        &d.reconciliation,
        d.note.as_deref(),
    );
    rows.insert(1, vec!["Entries".into(), d.summary.entries.to_string()]);
    println!("{}", pretty_table(&["Field", "Value"], rows));
    if !d.reconciliation.is_valid {
        println!(
            "A note is required before this session can be closed (|variance| > {})",
            fmt_money(reconcile::justification_threshold(), ccy)
        );
    }
    Ok(())
}

/// Reconciles the day and records the session. With `--push` the backend
/// receives it first, so a failed submit leaves nothing stored locally.
pub fn close(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<CashSession> {
    let args = close_args(sub)?;
    if db::session_on(conn, args.date)?.is_some() {
        return Err(ValidationError::SessionExists(args.date).into());
    }
    let ledger = sealed_ledger(conn, args.date)?;
    let opening = match args.opening {
        Some(o) => o,
        None => db::opening_cash_for(conn, args.date)?,
    };
    let new = match NewCashSession::close(&ledger, opening, args.counted, args.note) {
        Ok(s) => s,
        Err(e) => {
            warn!(date = %args.date, error = %e, "cash session rejected");
            return Err(e.into());
        }
    };

    if sub.get_flag("push") {
        let backend = Backend::from_settings(settings)?;
        let remote = backend.submit_session(&new)?;
        info!(remote_id = remote.id, date = %remote.date, "cash session submitted");
        println!("Submitted to backend as session {}", remote.id);
    }
    db::insert_session(conn, &new)
}

fn reconciliation_rows(
    ccy: &str,
    date: NaiveDate,
    count: CashCount,
    transfer_total: rust_decimal::Decimal,
    r: &Reconciliation,
    note: Option<&str>,
) -> Vec<Vec<String>> {
    let money = |d| fmt_money(d, ccy);
    vec![
        vec!["Date".into(), date.to_string()],
        vec!["Opening cash".into(), money(count.opening_cash.value())],
        vec!["Cash income".into(), money(count.cash_income.value())],
        vec!["Cash expense".into(), money(count.cash_expense.value())],
        vec!["Expected cash".into(), money(r.expected_cash)],
        vec!["Counted cash".into(), money(count.counted_cash.value())],
        vec![
            "Variance".into(),
            format!("{} ({})", money(r.variance), r.kind.label()),
        ],
        vec!["Transfers (info)".into(), money(transfer_total)],
        vec![
            "Justification".into(),
            (if r.requires_justification { "required" } else { "not required" }).into(),
        ],
        vec!["Note".into(), note.unwrap_or("").to_string()],
    ]
}

fn print_session(settings: &Settings, s: &CashSession) {
    let mut rows = reconciliation_rows(
        &settings.currency,
        s.date,
        s.count(),
        s.transfer_total.value(),
        &s.reconciliation(),
        s.note.as_deref(),
    );
    rows.insert(0, vec!["ID".into(), s.id.to_string()]);
    rows.push(vec!["Created".into(), s.created_at.clone()]);
    println!("{}", pretty_table(&["Field", "Value"], rows));
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let month = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?;
    let sessions = if sub.get_flag("remote") {
        let mut all = Backend::from_settings(settings)?.cash_sessions()?;
        if let Some(m) = &month {
            all.retain(|s| s.date.format("%Y-%m").to_string() == *m);
        }
        all.sort_by(|a, b| b.date.cmp(&a.date));
        all
    } else {
        db::list_sessions(conn, month.as_deref())?
    };
    let reports: Vec<SessionReport<'_>> = sessions.iter().map(SessionReport::from).collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &reports)? {
        return Ok(());
    }
    let ccy = &settings.currency;
    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.session.id.to_string(),
                r.session.date.to_string(),
                fmt_money(r.reconciliation.expected_cash, ccy),
                fmt_money(r.session.counted_cash.value(), ccy),
                fmt_money(r.reconciliation.variance, ccy),
                r.reconciliation.kind.label().to_string(),
                r.session.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Expected", "Counted", "Variance", "Kind", "Note"],
            rows,
        )
    );
    Ok(())
}
