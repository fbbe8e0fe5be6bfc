mod report;
mod store;
mod transaction;

pub use self::{
    report::{round_amount, write_csv, write_json, ReportOptions, Summary},
    store::{Dominance, StoreError, StoreResult, TransactionStore},
    transaction::{
        Transaction, TransactionDate, TransactionError, TransactionId, TransactionResult,
        TransactionType,
    },
};
