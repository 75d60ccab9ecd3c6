//! Plain-text statement report.

use std::fmt::Write;

use tally_core::Category;
use tally_finance::{BatchReport, ProcessedStatement};

const DESCRIPTION_WIDTH: usize = 40;

pub fn render_table(out: &ProcessedStatement) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:<10}  {:<w$}  {:>12}  {:<7}  {}",
        "Date",
        "Description",
        "Amount",
        "Type",
        "Category",
        w = DESCRIPTION_WIDTH
    );
    for t in &out.transactions {
        let _ = writeln!(
            s,
            "{:<10}  {:<w$}  {:>12}  {:<7}  {}",
            t.date.format("%Y-%m-%d"),
            clip(&t.description, DESCRIPTION_WIDTH),
            t.signed_amount().to_string(),
            t.direction.as_str(),
            t.category,
            w = DESCRIPTION_WIDTH
        );
    }

    let summary = &out.summary;
    let _ = writeln!(s, "\nTransactions: {}", summary.count);
    let _ = writeln!(s, "Income:       {}", summary.income);
    let _ = writeln!(s, "Expenses:     {}", summary.expenses);
    let _ = writeln!(s, "Net:          {}", summary.net());

    if !summary.by_category.is_empty() {
        let _ = writeln!(s, "\nExpenses by category:");
        for category in Category::ALL {
            if let Some(total) = summary.by_category.get(&category) {
                let _ = writeln!(s, "  {:<30} {:>12}", category.label(), total.to_string());
            }
        }
    }

    if let Some(line) = classifier_line(&out.report) {
        let _ = writeln!(s, "\n{line}");
    }
    s
}

fn classifier_line(report: &BatchReport) -> Option<String> {
    if report.ai_calls_made == 0 {
        return None;
    }
    let mut line = format!(
        "AI classifier: {} calls, {} accepted, {} unmapped, {} errors",
        report.ai_calls_made, report.ai_accepted, report.ai_unmapped, report.ai_errors
    );
    if let Some(reason) = &report.breaker_tripped {
        line.push_str(&format!(" (disabled: {reason})"));
    }
    Some(line)
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
