// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tillclose::{cli, commands, config::Settings, db};

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tillclose=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    setup_tracing(matches.get_flag("verbose"));

    let db_path = matches.get_one::<String>("db").map(PathBuf::from);
    let conn = db::open_or_init(db_path.as_deref())?;
    let settings = Settings::load(&conn)?;

    match matches.subcommand() {
        Some(("init", _)) => match &db_path {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!(
                "Database initialized at {}",
                tillclose::config::default_db_path()?.display()
            ),
        },
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, &settings, sub)?,
        Some(("calc", sub)) => commands::calc::handle(&settings, sub)?,
        Some(("session", sub)) => commands::sessions::handle(&conn, &settings, sub)?,
        Some(("sync", sub)) => commands::sync::handle(&conn, &settings, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
