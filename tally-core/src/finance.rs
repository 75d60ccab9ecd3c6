//! Transaction record types shared by the ingest and finance crates

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of characters of the source line kept on a record.
pub const RAW_LINE_MAX_CHARS: usize = 150;

/// Shortest fragment accepted as a partial category label
const MIN_PARTIAL_LABEL: usize = 4;

/// A transaction recovered from statement text.
///
/// Every field is filled in before the extractor hands a candidate out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionCandidate {
    /// Operation date (sticky across continuation lines)
    pub date: NaiveDate,
    /// Merchant/concept text, whitespace collapsed
    pub description: String,
    /// Always positive; `direction` carries the sign
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
    /// Original statement line, truncated, for auditing
    pub raw_line: String,
}

impl TransactionCandidate {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        direction: Direction,
        category: Category,
        raw_line: &str,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            direction,
            category,
            raw_line: truncate_chars(raw_line, RAW_LINE_MAX_CHARS),
        }
    }

    /// Amount with sign applied: income positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Income => self.amount,
            Direction::Expense => -self.amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.direction == Direction::Expense
    }

    pub fn is_income(&self) -> bool {
        self.direction == Direction::Income
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Income => "income",
            Direction::Expense => "expense",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spending categories. Closed set; `PersonalShopping` is the fallback.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "Food")]
    Food,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Payments/Recurring expenses")]
    PaymentsRecurring,
    #[default]
    #[serde(rename = "Personal shopping")]
    PersonalShopping,
    #[serde(rename = "Entertainment")]
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transportation,
        Category::PaymentsRecurring,
        Category::PersonalShopping,
        Category::Entertainment,
    ];

    /// Human-readable label, also the label external classifiers are asked for
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::PaymentsRecurring => "Payments/Recurring expenses",
            Category::PersonalShopping => "Personal shopping",
            Category::Entertainment => "Entertainment",
        }
    }

    /// Map a free-text label onto the taxonomy.
    ///
    /// Exact (case-insensitive) matches win; otherwise the first category whose
    /// label contains, or is contained in, the given text.
    pub fn from_label(label: &str) -> Option<Category> {
        let wanted = label.trim().trim_matches(|c: char| c == '"' || c == '.' || c == '\'');
        if wanted.is_empty() {
            return None;
        }
        let wanted = wanted.to_lowercase();

        if let Some(exact) = Category::ALL
            .iter()
            .find(|c| c.label().to_lowercase() == wanted)
        {
            return Some(*exact);
        }

        Category::ALL.iter().copied().find(|c| {
            let name = c.label().to_lowercase();
            wanted.contains(&name) || (wanted.chars().count() >= MIN_PARTIAL_LABEL && name.contains(&wanted))
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
