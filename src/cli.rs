use std::{path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use transaction_analyzer::TransactionId;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Query and aggregate a JSON file of transactions")]
pub struct Cli {
    /// JSON array of transaction records
    #[clap(short, long, default_value = "transaction.json")]
    pub file: PathBuf,

    /// Output for transaction lists: json or csv
    #[clap(long, default_value = "json")]
    pub format: OutputFormat,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown format {other:?}, expected json or csv")),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run every query with the default parameters (the default command)
    Summary,
    /// Every transaction in file order
    All,
    /// Distinct transaction types in order of first appearance
    Types,
    /// Sum of all amounts
    Total,
    /// Mean amount, fails on an empty file
    Average,
    /// Transactions of one type (case-sensitive)
    ByType { transaction_type: String },
    /// Transactions dated between START and END, both inclusive
    DateRange { start: String, end: String },
    /// Transactions of one merchant
    Merchant { name: String },
    /// Transactions with MIN <= amount <= MAX
    #[clap(allow_negative_numbers = true)]
    AmountRange { min: Decimal, max: Decimal },
    /// Sum of debit amounts
    TotalDebit,
    /// Sum of credit amounts
    TotalCredit,
    /// Month with the most transactions
    BusiestMonth,
    /// Month with the most debit transactions
    BusiestDebitMonth,
    /// Whether debits or credits are more numerous
    DominantType,
    /// Transactions strictly before DATE
    Before { date: String },
    /// Transactions strictly after DATE
    After { date: String },
    /// First transaction with the given id
    Find {
        id: String,
        /// Match a numeric id instead of a string id
        #[clap(long)]
        numeric: bool,
    },
    /// Descriptions in file order
    Descriptions,
}

/// Ids are matched by type as well as value, so `3` only finds a numeric id
/// when asked for with `--numeric`.
pub fn lookup_id(id: &str, numeric: bool) -> anyhow::Result<TransactionId> {
    if !numeric {
        return Ok(TransactionId::from(id));
    }
    let id: i64 = id
        .parse()
        .with_context(|| format!("{id:?} is not a numeric id"))?;
    Ok(TransactionId::from(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["transaction-analyzer"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("transaction.json"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_parse_date_range() {
        let cli = Cli::try_parse_from([
            "transaction-analyzer",
            "--file",
            "data/transaction.json",
            "--format",
            "csv",
            "date-range",
            "2019-01-01",
            "2019-12-31",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(
            cli.command,
            Some(Command::DateRange {
                start: "2019-01-01".into(),
                end: "2019-12-31".into()
            })
        );
    }

    #[test]
    fn test_parse_negative_amount_range() {
        let cli =
            Cli::try_parse_from(["transaction-analyzer", "amount-range", "-10", "12.5"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::AmountRange {
                min: dec!(-10),
                max: dec!(12.5)
            })
        );
    }

    #[test]
    fn test_reject_unknown_format() {
        assert!(Cli::try_parse_from(["transaction-analyzer", "--format", "xml"]).is_err());
    }

    #[test_case("3", false, TransactionId::from("3") ; "text")]
    #[test_case("3", true, TransactionId::from(3i64) ; "numeric")]
    #[test_case("abc", false, TransactionId::from("abc") ; "non numeric text")]
    fn test_lookup_id(id: &str, numeric: bool, expected: TransactionId) {
        assert_eq!(lookup_id(id, numeric).unwrap(), expected);
    }

    #[test]
    fn test_lookup_id_rejects_non_numeric() {
        assert!(lookup_id("abc", true).is_err());
    }
}
