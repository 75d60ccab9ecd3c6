//! Write categorized transactions out as CSV or JSON.

use std::io::Write;

use anyhow::{Context, Result};
use tally_core::TransactionCandidate;

pub const CSV_HEADERS: [&str; 5] = ["Date", "Description", "Amount", "Type", "Category"];

/// One CSV row per transaction, amounts unsigned with the direction in `Type`.
pub fn write_csv<W: Write>(writer: W, transactions: &[TransactionCandidate]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS).context("writing csv header")?;

    for txn in transactions {
        wtr.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.amount.to_string(),
            txn.direction.as_str().to_string(),
            txn.category.label().to_string(),
        ])
        .with_context(|| format!("writing csv row for {}", txn.description))?;
    }

    wtr.flush().context("flushing csv")?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, transactions: &[TransactionCandidate]) -> Result<()> {
    serde_json::to_writer_pretty(writer, transactions).context("writing json")?;
    Ok(())
}
