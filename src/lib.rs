//! In-memory queries and aggregations over a JSON collection of transactions.
//!
//! Records are validated once when they enter a [`TransactionStore`]; every
//! query afterwards is a single read-only pass over them.

#[macro_use]
extern crate log;

pub mod features;

pub use features::{
    Dominance, ReportOptions, StoreError, StoreResult, Summary, Transaction, TransactionDate,
    TransactionError, TransactionId, TransactionStore, TransactionType,
};
