use std::io::{self, Write};
use std::process;
#[macro_use]
extern crate log;

mod cli;
use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, OutputFormat};
use transaction_analyzer::{
    features::{round_amount, write_csv, write_json},
    ReportOptions, Summary, Transaction, TransactionStore,
};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = TransactionStore::from_path(&cli.file)
        .with_context(|| format!("Unable to load {}", cli.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(
        &store,
        cli.command.unwrap_or(Command::Summary),
        cli.format,
        &mut out,
    )
}

fn execute<W: Write>(
    store: &TransactionStore,
    command: Command,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Summary => {
            let summary = Summary::build(store, &ReportOptions::default())?;
            write_json(out, &summary)?;
        }
        Command::All => print_transactions(out, format, store.all().iter())?,
        Command::Types => {
            for transaction_type in store.unique_types() {
                writeln!(out, "{transaction_type}")?;
            }
        }
        Command::Total => writeln!(out, "{}", round_amount(store.total_amount()?))?,
        Command::Average => writeln!(out, "{}", round_amount(store.average_amount()?))?,
        Command::ByType { transaction_type } => {
            print_transactions(out, format, store.by_type(&transaction_type).into_iter())?
        }
        Command::DateRange { start, end } => {
            print_transactions(out, format, store.by_date_range(&start, &end)?.into_iter())?
        }
        Command::Merchant { name } => {
            print_transactions(out, format, store.by_merchant(&name).into_iter())?
        }
        Command::AmountRange { min, max } => {
            print_transactions(out, format, store.by_amount_range(min, max).into_iter())?
        }
        Command::TotalDebit => writeln!(out, "{}", round_amount(store.total_debit()?))?,
        Command::TotalCredit => writeln!(out, "{}", round_amount(store.total_credit()?))?,
        Command::BusiestMonth => writeln!(out, "{}", store.most_active_month()?)?,
        Command::BusiestDebitMonth => writeln!(out, "{}", store.most_active_debit_month()?)?,
        Command::DominantType => writeln!(out, "{}", store.dominant_type())?,
        Command::Before { date } => {
            print_transactions(out, format, store.before(&date)?.into_iter())?
        }
        Command::After { date } => {
            print_transactions(out, format, store.after(&date)?.into_iter())?
        }
        Command::Find { id, numeric } => {
            let transaction_id = cli::lookup_id(&id, numeric)?;
            let transaction = store
                .find_by_id(&transaction_id)
                .with_context(|| format!("No transaction with id {transaction_id}"))?;
            print_transactions(out, format, std::iter::once(transaction))?
        }
        Command::Descriptions => {
            for description in store.descriptions() {
                writeln!(out, "{description}")?;
            }
        }
    }
    Ok(())
}

fn print_transactions<'a, W: Write>(
    out: &mut W,
    format: OutputFormat,
    transactions: impl Iterator<Item = &'a Transaction>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &transactions.collect::<Vec<_>>())?,
        OutputFormat::Csv => write_csv(out, transactions)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TransactionStore {
        TransactionStore::from_path("data/transaction.json").unwrap()
    }

    fn output_of(command: Command, format: OutputFormat) -> anyhow::Result<String> {
        let mut output = Vec::new();
        execute(&store(), command, format, &mut output)?;
        Ok(String::from_utf8(output)?)
    }

    #[test]
    fn test_scalar_commands() -> anyhow::Result<()> {
        assert_eq!(output_of(Command::Total, OutputFormat::Json)?, "1023.75\n");
        assert_eq!(output_of(Command::TotalDebit, OutputFormat::Json)?, "490.25\n");
        assert_eq!(output_of(Command::TotalCredit, OutputFormat::Json)?, "533.5\n");
        assert_eq!(output_of(Command::Average, OutputFormat::Json)?, "102.375\n");
        assert_eq!(output_of(Command::BusiestMonth, OutputFormat::Json)?, "1\n");
        assert_eq!(output_of(Command::BusiestDebitMonth, OutputFormat::Json)?, "1\n");
        assert_eq!(output_of(Command::DominantType, OutputFormat::Json)?, "debit\n");
        assert_eq!(output_of(Command::Types, OutputFormat::Json)?, "debit\ncredit\n");
        Ok(())
    }

    #[test]
    fn test_find_is_type_sensitive() -> anyhow::Result<()> {
        let found = output_of(
            Command::Find {
                id: "3".into(),
                numeric: false,
            },
            OutputFormat::Csv,
        )?;
        assert!(found.contains("Dinner with friends"));

        let missing = output_of(
            Command::Find {
                id: "3".into(),
                numeric: true,
            },
            OutputFormat::Csv,
        );
        assert!(missing.is_err());
        Ok(())
    }

    #[test]
    fn test_merchant_as_csv() -> anyhow::Result<()> {
        let output = output_of(
            Command::Merchant {
                name: "SuperMart".into(),
            },
            OutputFormat::Csv,
        )?;
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("transaction_id,transaction_type,transaction_amount,transaction_date,merchant_name,transaction_description")
        );
        assert_eq!(lines.count(), 3);
        Ok(())
    }

    #[test]
    fn test_invalid_date_fails() {
        let result = output_of(
            Command::Before {
                date: "June".into(),
            },
            OutputFormat::Json,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_is_json() -> anyhow::Result<()> {
        let output = output_of(Command::Summary, OutputFormat::Csv)?;
        let value: serde_json::Value = serde_json::from_str(&output)?;
        assert_eq!(value["total_debit"], "490.25");
        assert_eq!(value["before_cutoff"].as_array().map(Vec::len), Some(6));
        Ok(())
    }
}
