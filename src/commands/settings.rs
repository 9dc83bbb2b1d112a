// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Settings, set_setting};
use crate::utils::{pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = required(sub, "key")?.trim();
            let value = set_setting(conn, key, required(sub, "value")?)?;
            println!("{} set to {}", key, value);
        }
        _ => {
            let s = Settings::load(conn)?;
            let rows = vec![
                vec!["currency".into(), s.currency],
                vec!["backend_url".into(), s.backend_url.unwrap_or_default()],
                vec!["timeout_secs".into(), s.timeout_secs.to_string()],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
    }
    Ok(())
}
