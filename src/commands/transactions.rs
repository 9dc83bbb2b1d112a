// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::db::{self, TxFilter};
use crate::models::{NewTransaction, PaymentMethod, Transaction, TxType};
use crate::utils::{
    fmt_money, maybe_print_json, parse_amount, parse_date, parse_id, parse_month, pretty_table,
    required,
};
use anyhow::{Result, anyhow};
use regex::Regex;
use rusqlite::Connection;

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, settings, sub)?,
        Some(("list", sub)) => list(conn, settings, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(required(sub, "id")?)?;
            let tx = db::soft_delete_transaction(conn, id)?;
            println!("Deleted transaction {} ({} {})", tx.id, tx.date, tx.kind.as_str());
        }
        _ => {}
    }
    Ok(())
}

pub fn new_transaction(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(NewTransaction {
        remote_id: None,
        date: parse_date(required(sub, "date")?)?,
        kind: required(sub, "type")?.parse::<TxType>()?,
        method: required(sub, "method")?.parse::<PaymentMethod>()?,
        total: parse_amount(required(sub, "total")?)?,
        description,
    })
}

fn add(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_transaction(sub)?;
    let tx = db::insert_transaction(conn, &new)?;
    println!(
        "Recorded {} {} ({}) on {} [id {}]",
        tx.kind.as_str(),
        fmt_money(tx.total.value(), &settings.currency),
        tx.method.as_str(),
        tx.date,
        tx.id
    );
    Ok(())
}

pub fn filter_from(sub: &clap::ArgMatches) -> Result<TxFilter> {
    let pattern = match sub.get_one::<String>("match") {
        Some(p) => Some(
            Regex::new(p.trim()).map_err(|err| anyhow!("Invalid regex pattern '{}': {}", p, err))?,
        ),
        None => None,
    };
    Ok(TxFilter {
        date: sub.get_one::<String>("date").map(|d| parse_date(d)).transpose()?,
        month: sub.get_one::<String>("month").map(|m| parse_month(m)).transpose()?,
        kind: sub
            .get_one::<String>("type")
            .map(|t| t.parse::<TxType>())
            .transpose()?,
        method: sub
            .get_one::<String>("method")
            .map(|t| t.parse::<PaymentMethod>())
            .transpose()?,
        pattern,
        limit: sub.get_one::<usize>("limit").copied(),
        include_deleted: sub.get_flag("include_deleted"),
    })
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    db::query_transactions(conn, &filter_from(sub)?)
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.as_str().to_string(),
                t.method.as_str().to_string(),
                fmt_money(t.total.value(), &settings.currency),
                t.description.clone().unwrap_or_default(),
                if t.is_deleted() { "deleted".into() } else { String::new() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Type", "Method", "Total", "Description", "Status"],
            rows,
        )
    );
    Ok(())
}
