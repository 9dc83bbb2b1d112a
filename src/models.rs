// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use crate::reconcile::{self, CashCount, Reconciliation};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest accepted amount, in whole currency units.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000_000;

/// Non-negative, bounded money value. Out-of-range figures are rejected on
/// construction, so calculator arithmetic on amounts cannot overflow.
///
/// Serializes as a JSON number. Whole amounts up to [`MAX_AMOUNT_UNITS`] are
/// exact in an `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn upper_bound() -> Decimal {
        Decimal::from(MAX_AMOUNT_UNITS)
    }

    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeAmount(value));
        }
        if value > Amount::upper_bound() {
            return Err(ValidationError::AmountTooLarge {
                value,
                max: Amount::upper_bound(),
            });
        }
        Ok(Amount(value.normalize()))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl From<u32> for Amount {
    fn from(units: u32) -> Self {
        Amount(Decimal::from(units))
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| ValidationError::MalformedRecord(format!("amount '{}': {}", s, e)))?;
        Amount::new(d)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let d = match value {
            ValueRef::Text(_) => value
                .as_str()?
                .parse::<Decimal>()
                .map_err(|e| FromSqlError::Other(Box::new(e)))?,
            ValueRef::Integer(i) => Decimal::from(i),
            _ => return Err(FromSqlError::InvalidType),
        };
        Amount::new(d).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }
}

impl FromStr for TxType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" => Ok(TxType::Income),
            "expense" | "egreso" | "gasto" => Ok(TxType::Expense),
            _ => Err(ValidationError::InvalidLabel {
                field: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            _ => Err(ValidationError::InvalidLabel {
                field: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! label_sql {
    ($t:ty) => {
        impl ToSql for $t {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $t {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: ValidationError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

label_sql!(TxType);
label_sql!(PaymentMethod);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub remote_id: Option<i64>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TxType,
    pub method: PaymentMethod,
    pub total: Amount,
    pub description: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

impl Transaction {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub remote_id: Option<i64>,
    pub date: NaiveDate,
    pub kind: TxType,
    pub method: PaymentMethod,
    pub total: Amount,
    pub description: Option<String>,
}

/// Transaction as the backend ships it. Labels and totals are untrusted
/// until converted into a [`RemoteTransaction`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub payment_method: String,
    pub total: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTransaction {
    pub record: NewTransaction,
    pub deleted: bool,
}

/// Backend dates are a calendar date, a naive timestamp, or an RFC 3339
/// timestamp. A timestamp with an offset is moved into `tz` before the day is
/// taken, so `2025-03-15T03:00:00Z` is the 14th in Bogotá.
pub fn wire_date_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<NaiveDate, ValidationError> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(tz).date_naive());
    }
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ValidationError::InvalidLabel {
        field: "date",
        value: s.to_string(),
    })
}

fn parse_wire_date(s: &str) -> Result<NaiveDate, ValidationError> {
    wire_date_in(s, &Local)
}

impl TryFrom<RawTransaction> for RemoteTransaction {
    type Error = ValidationError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let malformed =
            |e: ValidationError| ValidationError::MalformedRecord(format!("transaction {}: {}", raw.id, e));
        let date = parse_wire_date(&raw.date).map_err(malformed)?;
        let kind = raw.kind.parse::<TxType>().map_err(malformed)?;
        let method = raw.payment_method.parse::<PaymentMethod>().map_err(malformed)?;
        let total = Amount::new(raw.total).map_err(malformed)?;
        let description = raw
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(RemoteTransaction {
            record: NewTransaction {
                remote_id: Some(raw.id),
                date,
                kind,
                method,
                total,
                description,
            },
            deleted: raw.deleted,
        })
    }
}

/// A stored end-of-day cash session ("cierre de caja"). Expected cash and
/// variance are derived from the stored inputs on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashSession {
    pub id: i64,
    pub date: NaiveDate,
    pub opening_cash: Amount,
    pub cash_income: Amount,
    pub cash_expense: Amount,
    pub transfer_total: Amount,
    pub counted_cash: Amount,
    pub note: Option<String>,
    pub created_at: String,
}

impl CashSession {
    pub fn count(&self) -> CashCount {
        CashCount {
            opening_cash: self.opening_cash,
            cash_income: self.cash_income,
            cash_expense: self.cash_expense,
            counted_cash: self.counted_cash,
        }
    }

    pub fn reconciliation(&self) -> Reconciliation {
        reconcile::reconcile(&self.count(), self.note.as_deref().unwrap_or(""))
    }

    pub fn expected_cash(&self) -> Decimal {
        self.count().expected_cash()
    }

    pub fn variance(&self) -> Decimal {
        self.count().variance()
    }
}

/// Session record as the backend ships it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCashSession {
    pub id: i64,
    pub date: String,
    pub opening_cash: Decimal,
    pub cash_income: Decimal,
    pub cash_expense: Decimal,
    #[serde(default)]
    pub transfer_total: Decimal,
    pub counted_cash: Decimal,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TryFrom<RawCashSession> for CashSession {
    type Error = ValidationError;

    fn try_from(raw: RawCashSession) -> Result<Self, Self::Error> {
        let malformed =
            |e: ValidationError| ValidationError::MalformedRecord(format!("cash session {}: {}", raw.id, e));
        Ok(CashSession {
            id: raw.id,
            date: parse_wire_date(&raw.date).map_err(malformed)?,
            opening_cash: Amount::new(raw.opening_cash).map_err(malformed)?,
            cash_income: Amount::new(raw.cash_income).map_err(malformed)?,
            cash_expense: Amount::new(raw.cash_expense).map_err(malformed)?,
            transfer_total: Amount::new(raw.transfer_total).map_err(malformed)?,
            counted_cash: Amount::new(raw.counted_cash).map_err(malformed)?,
            note: raw.note.filter(|n| !n.trim().is_empty()),
            created_at: raw.created_at.unwrap_or_default(),
        })
    }
}
