//! CLI smoke and diagnostics entry point.
//!
//! # Responsibility
//! - Verify `jotdo_core` linkage without the Flutter/FFI runtime.
//! - Expose the quick-entry parser and recurrence expansion for manual checks.
//!
//! Usage:
//! - `jotdo` or `jotdo ping`: linkage probe.
//! - `jotdo parse <text...>`: print the parsed task as JSON.
//! - `jotdo occurrences <rule-json> [count]`: print upcoming instants.

use chrono::{Local, NaiveDateTime};
use jotdo_core::{expand, parse_task_input, RepeatRule};
use std::process::ExitCode;

const DEFAULT_OCCURRENCE_COUNT: usize = 5;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("ping") => {
            println!("jotdo_core ping={}", jotdo_core::ping());
            println!("jotdo_core version={}", jotdo_core::core_version());
            Ok(())
        }
        Some("version") => {
            println!("{}", jotdo_core::core_version());
            Ok(())
        }
        Some("parse") => parse(&args[1..].join(" ")),
        Some("occurrences") => occurrences(&args[1..]),
        Some(other) => Err(format!("unknown command `{other}`")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse(text: &str) -> Result<(), String> {
    let parsed = parse_task_input(text, now());
    let json = serde_json::to_string_pretty(&parsed).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn occurrences(args: &[String]) -> Result<(), String> {
    let raw_rule = args
        .first()
        .ok_or_else(|| "usage: jotdo occurrences <rule-json> [count]".to_string())?;
    let rule: RepeatRule =
        serde_json::from_str(raw_rule).map_err(|err| format!("invalid rule JSON: {err}"))?;
    let count = match args.get(1) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("invalid count `{raw}`"))?,
        None => DEFAULT_OCCURRENCE_COUNT,
    };

    let now = now();
    for instant in expand(&rule, now, now, count).map_err(|err| err.to_string())? {
        println!("{}", instant.format("%Y-%m-%d %H:%M %a"));
    }
    Ok(())
}
