//! Statement in, categorized transactions and totals out.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tally_core::{Category, TransactionCandidate};
use tally_ingest::{IngestError, PageSource, StatementLayout, TransactionExtractor};
use tracing::info;

use crate::categorizer::{BatchReport, Categorizer};

/// Totals over one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementSummary {
    pub count: usize,
    pub income: Decimal,
    pub expenses: Decimal,
    /// Expense totals per category
    pub by_category: BTreeMap<Category, Decimal>,
}

impl StatementSummary {
    pub fn from_transactions(transactions: &[TransactionCandidate]) -> Self {
        let mut summary = Self {
            count: transactions.len(),
            ..Self::default()
        };
        for txn in transactions {
            if txn.is_income() {
                summary.income += txn.amount;
            } else {
                summary.expenses += txn.amount;
                *summary.by_category.entry(txn.category).or_default() += txn.amount;
            }
        }
        summary
    }

    /// Income minus expenses.
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedStatement {
    pub transactions: Vec<TransactionCandidate>,
    pub summary: StatementSummary,
    pub report: BatchReport,
}

/// Read pages, extract candidates, then categorize them as one batch.
///
/// An extraction failure is the only error; classifier trouble degrades to
/// keyword categories and shows up in the report.
pub async fn process_statement(
    source: &dyn PageSource,
    layout: &dyn StatementLayout,
    fallback_year: i32,
    categorizer: &Categorizer<'_>,
) -> Result<ProcessedStatement, IngestError> {
    let pages = source.pages()?;
    let extractor = TransactionExtractor::new(layout, fallback_year)?;
    let candidates = extractor.extract_pages(&pages);

    let batch = categorizer.categorize_batch(&candidates).await;
    let summary = StatementSummary::from_transactions(&batch.transactions);
    info!(
        layout = layout.name(),
        pages = pages.len(),
        transactions = summary.count,
        "processed statement"
    );

    Ok(ProcessedStatement {
        transactions: batch.transactions,
        summary,
        report: batch.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::Direction;

    fn txn(description: &str, cents: i64, direction: Direction, category: Category) -> TransactionCandidate {
        TransactionCandidate::new(
            NaiveDate::from_ymd_opt(2024, 9, 5).unwrap(),
            description,
            Decimal::new(cents, 2),
            direction,
            category,
            description,
        )
    }

    #[test]
    fn test_summary_totals() {
        let txns = vec![
            txn("OXXO CENTRO", 4500, Direction::Expense, Category::Food),
            txn("STARBUCKS", 8000, Direction::Expense, Category::Food),
            txn("UBER VIAJE", 12000, Direction::Expense, Category::Transportation),
            txn("SPEI RECIBIDO", 1_500_000, Direction::Income, Category::PersonalShopping),
        ];
        let summary = StatementSummary::from_transactions(&txns);

        assert_eq!(summary.count, 4);
        assert_eq!(summary.income, Decimal::new(1_500_000, 2));
        assert_eq!(summary.expenses, Decimal::new(24500, 2));
        assert_eq!(summary.by_category[&Category::Food], Decimal::new(12500, 2));
        assert_eq!(summary.by_category[&Category::Transportation], Decimal::new(12000, 2));
        // income never lands in the category breakdown
        assert!(!summary.by_category.contains_key(&Category::PersonalShopping));
        assert_eq!(summary.net(), Decimal::new(1_475_500, 2));
    }

    #[test]
    fn test_summary_empty() {
        let summary = StatementSummary::from_transactions(&[]);
        assert_eq!(summary, StatementSummary::default());
    }
}
