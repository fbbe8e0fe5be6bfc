use std::io::{self, Write};

use super::store::{Dominance, StoreError, StoreResult, TransactionStore};
use super::transaction::{Transaction, TransactionId, TransactionType};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};

const AMOUNT_DECIMAL_PLACES: u32 = 4;

/// Query parameters for [`Summary::build`]. The defaults are the ones the
/// walk-through has always used.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub date_range: (String, String),
    pub merchant_name: String,
    pub amount_range: (Decimal, Decimal),
    pub cutoff_date: String,
    pub lookup_id: TransactionId,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            date_range: ("2019-01-01".into(), "2019-12-31".into()),
            merchant_name: "SuperMart".into(),
            amount_range: (dec!(50), dec!(100)),
            cutoff_date: "2019-06-01".into(),
            lookup_id: TransactionId::from("3"),
        }
    }
}

/// Every query of the store evaluated once. Aggregations with nothing to
/// aggregate are left empty instead of failing the whole report.
#[derive(Serialize, Debug)]
pub struct Summary<'a> {
    pub all_transactions: &'a [Transaction],
    pub unique_types: Vec<&'a TransactionType>,

    #[serde(serialize_with = "round_serialize")]
    pub total_amount: Decimal,

    #[serde(serialize_with = "round_serialize_opt")]
    pub average_amount: Option<Decimal>,

    pub debit_transactions: Vec<&'a Transaction>,
    pub credit_transactions: Vec<&'a Transaction>,
    pub in_date_range: Vec<&'a Transaction>,
    pub by_merchant: Vec<&'a Transaction>,
    pub in_amount_range: Vec<&'a Transaction>,

    #[serde(serialize_with = "round_serialize")]
    pub total_debit: Decimal,

    pub most_active_month: Option<u32>,
    pub most_active_debit_month: Option<u32>,
    pub dominant_type: Dominance,
    pub before_cutoff: Vec<&'a Transaction>,
    pub lookup: Option<&'a Transaction>,
    pub descriptions: Vec<&'a str>,
}

impl<'a> Summary<'a> {
    pub fn build(store: &'a TransactionStore, options: &ReportOptions) -> StoreResult<Self> {
        let (start, end) = &options.date_range;
        let (min, max) = options.amount_range;

        Ok(Self {
            all_transactions: store.all(),
            unique_types: store.unique_types(),
            total_amount: store.total_amount()?,
            average_amount: or_absent(store.average_amount())?,
            debit_transactions: store.by_type(TransactionType::Debit.as_str()),
            credit_transactions: store.by_type(TransactionType::Credit.as_str()),
            in_date_range: store.by_date_range(start, end)?,
            by_merchant: store.by_merchant(&options.merchant_name),
            in_amount_range: store.by_amount_range(min, max),
            total_debit: store.total_debit()?,
            most_active_month: or_absent(store.most_active_month())?,
            most_active_debit_month: or_absent(store.most_active_debit_month())?,
            dominant_type: store.dominant_type(),
            before_cutoff: store.before(&options.cutoff_date)?,
            lookup: store.find_by_id(&options.lookup_id),
            descriptions: store.descriptions(),
        })
    }
}

fn or_absent<T>(result: StoreResult<T>) -> StoreResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::EmptyCollection(what)) => {
            warn!("Leaving out the {what}, there is nothing to aggregate");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp(AMOUNT_DECIMAL_PLACES).normalize()
}

fn round_serialize<S>(amount: &Decimal, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Serialize to 4 decimal
    let rounded_amount = round_amount(*amount).to_string();
    s.serialize_str(rounded_amount.as_str())
}

fn round_serialize_opt<S>(amount: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match amount {
        Some(amount) => round_serialize(amount, s),
        None => s.serialize_none(),
    }
}

/// Pretty prints any serializable value as JSON followed by a newline.
pub fn write_json<T, W>(mut writer: W, value: &T) -> io::Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(&mut writer, value).map_err(io::Error::from)?;
    writeln!(writer)
}

/// Writes records as CSV, header first.
pub fn write_csv<T, W>(writer: W, records: impl Iterator<Item = T>) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
