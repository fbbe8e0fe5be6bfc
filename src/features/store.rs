use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use super::transaction::{
    Transaction, TransactionDate, TransactionError, TransactionId, TransactionType,
};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot compute the {0} of an empty collection")]
    EmptyCollection(&'static str),

    #[error(
        "Malformed record{} - {source}",
        .index.map(|index| format!(" at index {index}")).unwrap_or_default()
    )]
    MalformedRecord {
        index: Option<usize>,
        source: serde_json::Error,
    },

    #[error("The {0} does not fit in a decimal")]
    Overflow(&'static str),

    #[error("Invalid input - {0}")]
    Transaction(#[from] TransactionError),

    #[error("Unable to read transactions - {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = anyhow::Result<T, StoreError>;

/// Which of debit or credit has more records. Other labels never count.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dominance {
    Debit,
    Credit,
    Equal,
}

impl fmt::Display for Dominance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dominance::Debit => "debit",
            Dominance::Credit => "credit",
            Dominance::Equal => "equal",
        })
    }
}

/// Keeps every transaction in insertion order and answers queries over them.
///
/// Records are only ever appended. Queries borrow the store, so no query
/// result can outlive the next `add_transaction`.
#[derive(Debug, Default, Clone)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Parses a JSON array of transaction records.
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let values: Vec<Value> = serde_json::from_str(json)
            .map_err(|source| StoreError::MalformedRecord { index: None, source })?;
        Self::from_values(values)
    }

    pub fn from_reader<R: Read>(reader: R) -> StoreResult<Self> {
        let values: Vec<Value> = serde_json::from_reader(reader)
            .map_err(|source| StoreError::MalformedRecord { index: None, source })?;
        Self::from_values(values)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Reading transactions from {}", path.as_ref().display());
        Self::from_reader(BufReader::new(file))
    }

    fn from_values(values: Vec<Value>) -> StoreResult<Self> {
        let transactions = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                Transaction::from_value(value).map_err(|source| StoreError::MalformedRecord {
                    index: Some(index),
                    source,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        info!("Loaded {} transactions", transactions.len());
        Ok(Self::new(transactions))
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        trace!("Appending transaction {}", transaction.get_id());
        self.transactions.push(transaction);
    }

    /// Validates a loosely typed record and appends it. The store is left
    /// untouched when the record is malformed.
    pub fn add_record(&mut self, value: Value) -> StoreResult<()> {
        let transaction =
            Transaction::from_value(value).map_err(|source| StoreError::MalformedRecord {
                index: Some(self.transactions.len()),
                source,
            })?;
        self.add_transaction(transaction);
        Ok(())
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Distinct types in order of first appearance.
    pub fn unique_types(&self) -> Vec<&TransactionType> {
        let mut seen = HashSet::new();
        self.transactions
            .iter()
            .map(Transaction::get_type)
            .filter(|transaction_type| seen.insert(transaction_type.as_str()))
            .collect()
    }

    /// Fails with `Overflow` rather than wrapping when the sum leaves the
    /// decimal range, even though every amount on its own fits.
    pub fn total_amount(&self) -> StoreResult<Decimal> {
        sum("total amount", self.transactions.iter())
    }

    pub fn average_amount(&self) -> StoreResult<Decimal> {
        if self.is_empty() {
            return Err(StoreError::EmptyCollection("average amount"));
        }
        Ok(self.total_amount()? / Decimal::from(self.len()))
    }

    pub fn by_type(&self, transaction_type: &str) -> Vec<&Transaction> {
        self.filter(|t| t.is_type(transaction_type))
    }

    /// Both bounds are inclusive. A date without a time is midnight, so a
    /// record stamped later on the `end` day falls outside the range.
    pub fn by_date_range(&self, start: &str, end: &str) -> StoreResult<Vec<&Transaction>> {
        let start = TransactionDate::parse(start)?;
        let end = TransactionDate::parse(end)?;
        Ok(self.filter(|t| t.get_date() >= &start && t.get_date() <= &end))
    }

    pub fn by_merchant(&self, merchant_name: &str) -> Vec<&Transaction> {
        self.filter(|t| t.get_merchant_name() == merchant_name)
    }

    pub fn total_debit(&self) -> StoreResult<Decimal> {
        sum("total debit", self.iter_type(&TransactionType::Debit))
    }

    pub fn total_credit(&self) -> StoreResult<Decimal> {
        sum("total credit", self.iter_type(&TransactionType::Credit))
    }

    /// Both bounds are inclusive; `min > max` matches nothing.
    pub fn by_amount_range(&self, min: Decimal, max: Decimal) -> Vec<&Transaction> {
        self.filter(|t| (min..=max).contains(&t.get_amount()))
    }

    /// Month (1 to 12) holding the most transactions. Ties go to the lowest month.
    pub fn most_active_month(&self) -> StoreResult<u32> {
        busiest_month(self.transactions.iter())
            .ok_or(StoreError::EmptyCollection("most active month"))
    }

    pub fn most_active_debit_month(&self) -> StoreResult<u32> {
        busiest_month(self.iter_type(&TransactionType::Debit))
            .ok_or(StoreError::EmptyCollection("most active debit month"))
    }

    pub fn dominant_type(&self) -> Dominance {
        let debits = self.iter_type(&TransactionType::Debit).count();
        let credits = self.iter_type(&TransactionType::Credit).count();
        match debits.cmp(&credits) {
            std::cmp::Ordering::Greater => Dominance::Debit,
            std::cmp::Ordering::Less => Dominance::Credit,
            std::cmp::Ordering::Equal => Dominance::Equal,
        }
    }

    /// Transactions strictly earlier than `date`.
    pub fn before(&self, date: &str) -> StoreResult<Vec<&Transaction>> {
        let date = TransactionDate::parse(date)?;
        Ok(self.filter(|t| t.get_date() < &date))
    }

    /// Transactions strictly later than `date`.
    pub fn after(&self, date: &str) -> StoreResult<Vec<&Transaction>> {
        let date = TransactionDate::parse(date)?;
        Ok(self.filter(|t| t.get_date() > &date))
    }

    /// First transaction with this id, in insertion order.
    pub fn find_by_id(&self, transaction_id: &TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.get_id() == transaction_id)
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.transactions
            .iter()
            .map(Transaction::get_description)
            .collect()
    }

    fn iter_type<'a>(
        &'a self,
        transaction_type: &'a TransactionType,
    ) -> impl Iterator<Item = &'a Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.get_type() == transaction_type)
    }

    fn filter(&self, predicate: impl Fn(&Transaction) -> bool) -> Vec<&Transaction> {
        let matched: Vec<_> = self.transactions.iter().filter(|t| predicate(t)).collect();
        debug!("{} of {} transactions matched", matched.len(), self.len());
        matched
    }
}

fn sum<'a>(
    what: &'static str,
    mut transactions: impl Iterator<Item = &'a Transaction>,
) -> StoreResult<Decimal> {
    transactions.try_fold(dec!(0), |total, t| {
        total
            .checked_add(t.get_amount())
            .ok_or(StoreError::Overflow(what))
    })
}

fn busiest_month<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Option<u32> {
    let mut counts = BTreeMap::new();
    for transaction in transactions {
        *counts.entry(transaction.get_date().month()).or_insert(0usize) += 1;
    }

    // Ascending month order; only a strictly higher count replaces the leader.
    counts
        .into_iter()
        .fold(None, |leader: Option<(u32, usize)>, (month, count)| match leader {
            Some((_, top)) if top >= count => leader,
            _ => Some((month, count)),
        })
        .map(|(month, _)| month)
}
