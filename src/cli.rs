// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn amount_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).value_name("AMOUNT").help(help)
}

fn remote_flag(help: &'static str) -> Arg {
    Arg::new("remote")
        .long("remote")
        .action(ArgAction::SetTrue)
        .help(help)
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .value_name("YYYY-MM-DD")
        .required(true)
}

fn session_close_args(cmd: Command) -> Command {
    cmd.arg(date_arg().help("Day to reconcile"))
        .arg(amount_arg("counted", "Physically counted cash").required(true))
        .arg(amount_arg(
            "opening",
            "Opening cash (defaults to the previous session's counted cash)",
        ))
        .arg(
            Arg::new("note")
                .long("note")
                .help("Justification; mandatory when the variance is significant"),
        )
}

pub fn build_cli() -> Command {
    Command::new("tillclose")
        .about("End-of-day cash reconciliation and transaction ledger")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("SQLite database to use instead of the platform data dir"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Income and expense transactions")
                .subcommand(
                    Command::new("add")
                        .arg(date_arg())
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income | expense"),
                        )
                        .arg(
                            Arg::new("method")
                                .long("method")
                                .required(true)
                                .help("cash | transfer"),
                        )
                        .arg(amount_arg("total", "Transaction total").required(true))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_name("YYYY-MM")
                                .conflicts_with("date"),
                        )
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("method").long("method"))
                        .arg(
                            Arg::new("match")
                                .long("match")
                                .value_name("REGEX")
                                .help("Only descriptions matching this pattern"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("include_deleted")
                                .long("include-deleted")
                                .action(ArgAction::SetTrue),
                        ),
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Soft-delete a transaction")
                        .arg(Arg::new("id").long("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("calc")
                .about("Run the reconciliation arithmetic without touching the ledger")
                .arg(amount_arg("opening", "Opening cash").required(true))
                .arg(amount_arg("income", "Cash income").required(true))
                .arg(amount_arg("expense", "Cash expense").required(true))
                .arg(amount_arg("counted", "Counted cash").required(true))
                .arg(Arg::new("note").long("note"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("session")
                .about("End-of-day cash sessions")
                .subcommand(session_close_args(
                    Command::new("preview")
                        .about("Show the reconciliation for a day without saving")
                        .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
                ))
                .subcommand(session_close_args(
                    Command::new("close")
                        .about("Reconcile a day and record its cash session")
                        .arg(
                            Arg::new("push")
                                .long("push")
                                .action(ArgAction::SetTrue)
                                .help("Also submit the session to the backend"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                        .arg(remote_flag("List the backend's sessions instead")),
                ))
                .subcommand(
                    Command::new("show")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a cash session and reopen its day")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(remote_flag("Delete the backend session with this id instead")),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Pull a day's transactions from the backend")
                .arg(date_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Export sessions or transactions")
                .subcommand(export_args(Command::new("sessions")))
                .subcommand(export_args(Command::new("transactions"))),
        )
}

fn export_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("format")
            .long("format")
            .default_value("csv")
            .help("csv | json"),
    )
    .arg(Arg::new("out").long("out").required(true))
}
