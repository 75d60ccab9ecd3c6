use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a statement line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// Column captions, account/RFC/CLABE labels, page numbers
    Header,
    /// Legal boilerplate and bank footer text
    Footer,
    /// PDF encoding leftovers and certificate blobs
    Artifact,
    Address,
    TooShort,
    /// Totals, percentages, disclosures
    Summary,
    /// Reference codes and name-only lines
    Reference,
    /// Worth handing to the extractor
    Candidate,
}

impl LineKind {
    pub fn is_noise(&self) -> bool {
        !matches!(self, LineKind::Candidate)
    }
}

/// Where we are relative to the transaction-detail block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionState {
    #[default]
    Waiting,
    InSection,
    Done,
}

/// A line body split into description and amounts, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub description: String,
    /// First monetary token on the line
    pub amount: Decimal,
    /// Remaining tokens (running balances), kept only for diagnostics
    pub balances: Vec<Decimal>,
}
