// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Amount;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing required argument --{}", name))
}

pub fn parse_id(s: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", s))
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

/// True for `1,234` / `1.234.567` style integers: a 1-3 digit head without a
/// leading zero, then at least one group of exactly three digits.
fn is_grouped(int_part: &str, sep: char) -> bool {
    let digits = |g: &str| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit());
    let mut groups = int_part.split(sep);
    let head = groups.next().unwrap_or_default();
    let rest: Vec<&str> = groups.collect();
    digits(head)
        && head.len() <= 3
        && !head.starts_with('0')
        && !rest.is_empty()
        && rest.iter().all(|g| g.len() == 3 && digits(g))
}

/// Parses operator input into a non-negative amount. `.` is the decimal point.
/// `_` may group digits anywhere, and `,` only as a thousands separator
/// (`140,000`, `1,234.5`). Inputs that read differently under the other
/// convention, such as `20000,5` or `150.000`, are rejected.
pub fn parse_amount(s: &str) -> Result<Amount> {
    let cleaned = s.trim().replace('_', "");
    let ambiguous = || {
        anyhow!(
            "Ambiguous amount '{}': use '.' for decimals and ',' only between thousands",
            s
        )
    };
    let plain = if cleaned.contains(',') {
        let (int_part, frac) = match cleaned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (cleaned.as_str(), None),
        };
        if !is_grouped(int_part, ',') || frac.is_some_and(|f| f.contains(',')) {
            return Err(ambiguous());
        }
        cleaned.replace(',', "")
    } else if is_grouped(&cleaned, '.') {
        return Err(ambiguous());
    } else {
        cleaned
    };
    let d = plain
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s))?;
    Ok(Amount::new(d)?)
}

/// `COP 1,234,567` / `COP -1,500.50`.
pub fn fmt_money(d: Decimal, ccy: &str) -> String {
    let d = d.round_dp(2).normalize();
    let neg = d.is_sign_negative() && !d.is_zero();
    let text = d.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if neg { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{} {}{}.{}", ccy, sign, grouped, f),
        None => format!("{} {}{}", ccy, sign, grouped),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(fmt_money(Decimal::from(140_000), "COP"), "COP 140,000");
        assert_eq!(fmt_money(Decimal::from(-1), "COP"), "COP -1");
        assert_eq!(fmt_money(Decimal::new(-150_050, 2), "USD"), "USD -1,500.5");
        assert_eq!(fmt_money(Decimal::ZERO, "COP"), "COP 0");
    }

    #[test]
    fn amount_input_accepts_separators() {
        assert_eq!(parse_amount("140,000").unwrap(), Amount::from(140_000));
        assert_eq!(parse_amount(" 25_000 ").unwrap(), Amount::from(25_000));
        assert_eq!(parse_amount("1,234.5").unwrap().to_string(), "1234.5");
        assert_eq!(parse_amount("20000.5").unwrap().to_string(), "20000.5");
        assert_eq!(parse_amount("0.500").unwrap().to_string(), "0.5");
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn amount_input_rejects_ambiguous_separators() {
        for input in ["20000,5", "150.000", "1.500.000", "12,34", "1,234,5", "0,500"] {
            let err = parse_amount(input).unwrap_err();
            assert!(err.to_string().contains("Ambiguous"), "{}: {}", input, err);
        }
    }
}
