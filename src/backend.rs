// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the business REST backend.
//!
//! Requests are fire-and-wait with no retries. Every record that comes back
//! is converted through its validated `TryFrom` before the caller sees it.

use crate::config::Settings;
use crate::ledger::NewCashSession;
use crate::models::{CashSession, RawCashSession, RawTransaction, RemoteTransaction};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const UA: &str = concat!(
    "tillclose/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/tillclose)"
);

pub fn http_client(timeout_secs: u64) -> Result<Client> {
    let c = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub struct Backend {
    client: Client,
    base_url: String,
}

impl Backend {
    pub fn new(client: Client, base_url: &str) -> Self {
        Backend {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let url = settings.backend_url()?;
        Ok(Backend::new(http_client(settings.timeout_secs)?, url))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn day_transactions(&self, date: NaiveDate) -> Result<Vec<RemoteTransaction>> {
        let url = self.url("transactions");
        debug!(%url, %date, "fetching transactions");
        let resp = self
            .client
            .get(&url)
            .query(&[("date", date.to_string())])
            .send()
            .with_context(|| format!("GET {}", url))?;
        let raw: Vec<RawTransaction> = read_json(resp, &url)?;
        parse_transactions(raw, date)
    }

    pub fn cash_sessions(&self) -> Result<Vec<CashSession>> {
        let url = self.url("cash-sessions");
        debug!(%url, "fetching cash sessions");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {}", url))?;
        let raw: Vec<RawCashSession> = read_json(resp, &url)?;
        raw.into_iter()
            .map(|r| CashSession::try_from(r).map_err(anyhow::Error::from))
            .collect()
    }

    pub fn submit_session(&self, session: &NewCashSession) -> Result<CashSession> {
        let url = self.url("cash-sessions");
        debug!(%url, date = %session.date(), "submitting cash session");
        let resp = self
            .client
            .post(&url)
            .json(session)
            .send()
            .with_context(|| format!("POST {}", url))?;
        let raw: RawCashSession = read_json(resp, &url)?;
        Ok(CashSession::try_from(raw)?)
    }

    pub fn delete_session(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("cash-sessions/{}", id));
        let resp = self
            .client
            .delete(&url)
            .send()
            .with_context(|| format!("DELETE {}", url))?;
        check_status(resp, &url)?;
        Ok(())
    }
}

fn check_status(resp: Response, url: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    warn!(%url, %status, "backend request failed");
    Err(anyhow!("Backend returned {} for {}: {}", status, url, body.trim()))
}

fn read_json<T: DeserializeOwned>(resp: Response, url: &str) -> Result<T> {
    let resp = check_status(resp, url)?;
    let body = resp.text().with_context(|| format!("Read body of {}", url))?;
    serde_json::from_str(&body).with_context(|| format!("Decode response of {}", url))
}

/// Validates a day's worth of backend records. A single malformed record
/// fails the whole batch, so a session is never computed from a partial day.
pub fn parse_transactions(
    raw: Vec<RawTransaction>,
    date: NaiveDate,
) -> Result<Vec<RemoteTransaction>> {
    let mut out = Vec::with_capacity(raw.len());
    for r in raw {
        let t = RemoteTransaction::try_from(r)?;
        if t.record.date != date {
            return Err(crate::error::ValidationError::DateMismatch {
                id: t.record.remote_id,
                expected: date,
                found: t.record.date,
            }
            .into());
        }
        out.push(t);
    }
    Ok(out)
}
