use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;

/// Date-time layouts accepted after RFC 3339 has been tried. Values are taken as UTC.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid date - {0:?}")]
    InvalidDate(String),
}

pub type TransactionResult<T> = anyhow::Result<T, TransactionError>;

/// Kind of movement. Labels other than `debit` and `credit` are kept verbatim,
/// matching is case-sensitive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    /// Money leaving the account
    Debit,

    /// Money entering the account
    Credit,

    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
            TransactionType::Other(label) => label,
        }
    }
}

impl From<String> for TransactionType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "debit" => TransactionType::Debit,
            "credit" => TransactionType::Credit,
            _ => TransactionType::Other(label),
        }
    }
}

impl From<&str> for TransactionType {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<TransactionType> for String {
    fn from(transaction_type: TransactionType) -> Self {
        match transaction_type {
            TransactionType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier as it appears in the source document. A numeric id never
/// equals its string spelling: `3` and `"3"` are different ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum TransactionId {
    Number(i64),
    Text(String),
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        TransactionId::Number(id)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        TransactionId::Text(id.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        TransactionId::Text(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionId::Number(id) => write!(f, "{id}"),
            TransactionId::Text(id) => write!(f, "{id:?}"),
        }
    }
}

/// A parsed transaction date. The source text is kept for output; equality
/// and ordering use the parsed instant only.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionDate {
    text: String,
    at: NaiveDateTime,
}

impl TransactionDate {
    /// Accepts `YYYY-MM-DD` (midnight), RFC 3339 (normalised to UTC) and
    /// `YYYY-MM-DD[T ]HH:MM:SS[.fff]`.
    pub fn parse(text: &str) -> TransactionResult<Self> {
        Self::try_from(text.to_string())
    }

    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    /// Calendar month, 1 to 12.
    pub fn month(&self) -> u32 {
        self.at.month()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

impl FromStr for TransactionDate {
    type Err = TransactionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl TryFrom<String> for TransactionDate {
    type Error = TransactionError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        match parse_date_time(&text) {
            Some(at) => Ok(Self { text, at }),
            None => Err(TransactionError::InvalidDate(text)),
        }
    }
}

impl From<TransactionDate> for String {
    fn from(date: TransactionDate) -> Self {
        date.text
    }
}

impl PartialEq for TransactionDate {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for TransactionDate {}

impl PartialOrd for TransactionDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TransactionDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at)
    }
}

impl fmt::Display for TransactionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Not guaranteed to be unique
    #[serde(rename = "transaction_id", alias = "id")]
    transaction_id: TransactionId,

    #[serde(rename = "transaction_type", alias = "type")]
    transaction_type: TransactionType,

    /// Unsigned and unbounded, the store applies no constraint
    #[serde(
        rename = "transaction_amount",
        alias = "amount",
        with = "rust_decimal::serde::float"
    )]
    amount: Decimal,

    #[serde(rename = "transaction_date", alias = "date")]
    date: TransactionDate,

    #[serde(rename = "merchant_name", alias = "merchantName")]
    merchant_name: String,

    #[serde(rename = "transaction_description", alias = "description")]
    description: String,
}

impl Transaction {
    pub fn new(
        transaction_id: impl Into<TransactionId>,
        transaction_type: impl Into<TransactionType>,
        amount: Decimal,
        date: &str,
        merchant_name: impl Into<String>,
        description: impl Into<String>,
    ) -> TransactionResult<Self> {
        Ok(Self {
            transaction_id: transaction_id.into(),
            transaction_type: transaction_type.into(),
            amount,
            date: TransactionDate::parse(date)?,
            merchant_name: merchant_name.into(),
            description: description.into(),
        })
    }

    /// Builds a transaction out of a loosely typed JSON record. Missing or
    /// mistyped fields and unparseable dates are rejected here so queries
    /// never see them.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn is_type(&self, transaction_type: &str) -> bool {
        self.transaction_type.as_str() == transaction_type
    }

    pub fn get_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn get_type(&self) -> &TransactionType {
        &self.transaction_type
    }

    /// Get the transaction's amount.
    pub fn get_amount(&self) -> Decimal {
        self.amount
    }

    pub fn get_date(&self) -> &TransactionDate {
        &self.date
    }

    pub fn get_merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }
}
