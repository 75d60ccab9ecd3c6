//! Turns statement text into validated transaction candidates.
//!
//! Lines flow through the section gate, the layout's noise/reference rules,
//! then date, amount and description parsing. Rows that only continue a
//! previous row (no date of their own) inherit the last resolved date.

use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use tally_core::{categorize, TransactionCandidate};
use tracing::{debug, info};

use crate::dates::DateResolver;
use crate::error::Result;
use crate::layout::StatementLayout;
use crate::section::SectionTracker;
use crate::types::{ParsedLine, SectionState};

/// Shortest description accepted, in characters
pub const MIN_DESCRIPTION_CHARS: usize = 5;

/// Descriptions at or above this digit share (in tenths) are rejected
const MAX_DIGIT_TENTHS: usize = 7;

const DATE_TOKEN: &str = r"\d{2}/[A-Z]{3}|\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2}|\d{2}-\d{2}-\d{4}";

/// Amounts accepted: strictly above this...
pub fn min_amount() -> Decimal {
    Decimal::ONE
}

/// ...and at most this.
pub fn max_amount() -> Decimal {
    Decimal::from(10_000_000)
}

/// Per-document mutable parse state. Built fresh for every `extract` call.
#[derive(Debug, Clone)]
pub struct ParserState {
    pub current_date: Option<NaiveDate>,
    /// Year read from the statement header, if it had one
    pub inferred_year: Option<i32>,
    pub section: SectionTracker,
    dates: DateResolver,
}

impl ParserState {
    pub fn section_state(&self) -> SectionState {
        self.section.state()
    }

    pub fn resolver(&self) -> &DateResolver {
        &self.dates
    }
}

pub struct TransactionExtractor<'a> {
    layout: &'a dyn StatementLayout,
    fallback_year: i32,
    leading_dates_re: Regex,
    amount_re: Regex,
}

impl<'a> TransactionExtractor<'a> {
    /// `fallback_year` is used when the statement has no period header.
    pub fn new(layout: &'a dyn StatementLayout, fallback_year: i32) -> Result<Self> {
        let leading_dates_re = Regex::new(&format!(
            r"^(?P<oper>{DATE_TOKEN})(?:\s+(?P<settle>{DATE_TOKEN}))?(?:\s+|$)"
        ))?;
        let amount_re = Regex::new(r"\d{1,3}(?:,\d{3})*\.\d{2}|\d+\.\d{2}")?;

        Ok(Self {
            layout,
            fallback_year,
            leading_dates_re,
            amount_re,
        })
    }

    /// Fresh state for one document.
    pub fn start_document(&self, text: &str) -> ParserState {
        let inferred_year = self.layout.statement_year(text);
        let year = inferred_year.unwrap_or(self.fallback_year);
        ParserState {
            current_date: None,
            inferred_year,
            section: SectionTracker::new(self.layout.start_marker(), self.layout.end_markers()),
            dates: DateResolver::new(year, self.layout.months()),
        }
    }

    /// Extract from ordered page texts.
    pub fn extract_pages(&self, pages: &[String]) -> Vec<TransactionCandidate> {
        self.extract(&pages.join("\n"))
    }

    /// Extract every transaction from a whole document's text, in order.
    pub fn extract(&self, text: &str) -> Vec<TransactionCandidate> {
        let mut state = self.start_document(text);
        let out: Vec<_> = text
            .lines()
            .filter_map(|line| self.process_line(&mut state, line))
            .collect();

        info!(
            layout = self.layout.name(),
            year = state.dates.year(),
            year_from_header = state.inferred_year.is_some(),
            section = ?state.section_state(),
            transactions = out.len(),
            "extracted statement"
        );
        out
    }

    /// Run one line through the pipeline, updating `state`.
    pub fn process_line(&self, state: &mut ParserState, line: &str) -> Option<TransactionCandidate> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if !state.section.observe(line) {
            return None;
        }

        let classifier = self.layout.classifier();
        if let Some(rule) = classifier.noise_rule(line) {
            debug!(rule = rule.name, line, "skip noise");
            return None;
        }
        if let Some(rule) = classifier.reference_rule(line) {
            debug!(rule = rule.name, line, "skip reference");
            return None;
        }

        let remainder = match self.leading_dates_re.captures(line) {
            Some(caps) => {
                let Some(date) = state.dates.resolve(&caps["oper"]) else {
                    debug!(token = &caps["oper"], line, "skip unresolvable date");
                    return None;
                };
                state.current_date = Some(date);
                line[caps.get(0).map_or(0, |m| m.end())..].trim()
            }
            None => line,
        };

        let Some(date) = state.current_date else {
            debug!(line, "skip line before first date");
            return None;
        };

        let parsed = self.split_amounts(remainder)?;
        if !self.is_valid(&parsed) {
            debug!(description = %parsed.description, amount = %parsed.amount, "skip invalid");
            return None;
        }

        let direction = self.layout.direction(&parsed.description);
        let category = categorize(&parsed.description);
        debug!(%date, description = %parsed.description, amount = %parsed.amount, %direction, "emit");

        Some(TransactionCandidate::new(
            date,
            parsed.description,
            parsed.amount,
            direction,
            category,
            line,
        ))
    }

    /// Split a date-less line body into description, amount and trailing balances.
    ///
    /// `None` if the body carries no monetary token.
    pub fn split_amounts(&self, remainder: &str) -> Option<ParsedLine> {
        let mut found = self.amount_re.find_iter(remainder);

        // an unrepresentable first amount drops the line; balances never stand in
        let first = found.next()?;
        let pos = first.start();
        let amount = parse_amount(first.as_str())?;
        let balances = found.filter_map(|m| parse_amount(m.as_str())).collect();

        let head = if pos > 0 { &remainder[..pos] } else { remainder };
        Some(ParsedLine {
            description: collapse_whitespace(head),
            amount,
            balances,
        })
    }

    fn is_valid(&self, parsed: &ParsedLine) -> bool {
        if parsed.amount <= min_amount() || parsed.amount > max_amount() {
            return false;
        }
        let chars = parsed.description.chars().count();
        if chars < MIN_DESCRIPTION_CHARS {
            return false;
        }
        let digits = parsed.description.chars().filter(|c| c.is_ascii_digit()).count();
        if digits * 10 >= chars * MAX_DIGIT_TENTHS {
            return false;
        }
        !self.layout.is_excluded_description(&parsed.description)
    }
}

fn parse_amount(token: &str) -> Option<Decimal> {
    Decimal::from_str(&token.replace(',', "")).ok()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
