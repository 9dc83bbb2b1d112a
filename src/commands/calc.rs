// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::reconcile::{self, CashCount, Reconciliation};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table, required};
use anyhow::Result;

pub fn run(sub: &clap::ArgMatches) -> Result<Reconciliation> {
    let count = CashCount {
        opening_cash: parse_amount(required(sub, "opening")?)?,
        cash_income: parse_amount(required(sub, "income")?)?,
        cash_expense: parse_amount(required(sub, "expense")?)?,
        counted_cash: parse_amount(required(sub, "counted")?)?,
    };
    let note = sub.get_one::<String>("note").map(String::as_str).unwrap_or("");
    Ok(reconcile::reconcile(&count, note))
}

pub fn handle(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let r = run(sub)?;
    if maybe_print_json(sub.get_flag("json"), false, &r)? {
        return Ok(());
    }
    let ccy = &settings.currency;
    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();
    println!(
        "{}",
        pretty_table(
            &["Expected", "Variance", "Kind", "Needs note", "Valid"],
            vec![vec![
                fmt_money(r.expected_cash, ccy),
                fmt_money(r.variance, ccy),
                r.kind.label().to_string(),
                yes_no(r.requires_justification),
                yes_no(r.is_valid),
            ]],
        )
    );
    Ok(())
}
