// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tillclose", "tillclose"));

pub const DEFAULT_CURRENCY: &str = "COP";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let dir = proj.data_dir();
    fs::create_dir_all(dir).context("Failed to create data dir")?;
    Ok(dir.to_path_buf())
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("tillclose.sqlite"))
}

/// Runtime settings, read from the `settings` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub currency: String,
    pub backend_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency: DEFAULT_CURRENCY.to_string(),
            backend_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub const KEYS: &[&str] = &["currency", "backend_url", "timeout_secs"];

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(c) = get_setting(conn, "currency")? {
            s.currency = c;
        }
        s.backend_url = get_setting(conn, "backend_url")?;
        if let Some(t) = get_setting(conn, "timeout_secs")? {
            s.timeout_secs = t
                .parse()
                .with_context(|| format!("Invalid timeout_secs '{}' in settings", t))?;
        }
        Ok(s)
    }

    pub fn backend_url(&self) -> Result<&str> {
        self.backend_url
            .as_deref()
            .ok_or_else(|| anyhow!("No backend configured; run `tillclose config set backend_url <URL>`"))
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Validates and normalizes a value before it is written.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    let normalized = match key {
        "currency" => {
            if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(anyhow!("Invalid currency code '{}'", value));
            }
            value.to_uppercase()
        }
        "backend_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(anyhow!("Backend URL must start with http:// or https://"));
            }
            value.trim_end_matches('/').to_string()
        }
        "timeout_secs" => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("Invalid timeout '{}'", value))?;
            if secs == 0 {
                return Err(anyhow!("Timeout must be at least one second"));
            }
            secs.to_string()
        }
        _ => {
            return Err(anyhow!(
                "Unknown setting '{}' (expected one of: {})",
                key,
                KEYS.join(", ")
            ));
        }
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, normalized],
    )?;
    Ok(normalized)
}
