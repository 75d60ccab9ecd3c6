//! Statement layouts: everything bank-specific the extractor needs to know.

use tally_core::Direction;

use crate::classifier::LineClassifier;
use crate::dates::MonthTable;
use crate::error::{IngestError, Result};
use crate::parsers::bbva_mx::BbvaMx;

/// A pluggable recognizer for one bank's statement text.
pub trait StatementLayout: Send + Sync {
    /// Short identifier used on the command line
    fn name(&self) -> &'static str;

    /// Marker opening the transaction-detail block
    fn start_marker(&self) -> &str;

    /// Markers closing the transaction-detail block
    fn end_markers(&self) -> &[&'static str];

    fn months(&self) -> MonthTable;

    /// Year printed in the statement period header, if any.
    fn statement_year(&self, text: &str) -> Option<i32>;

    fn classifier(&self) -> &LineClassifier;

    /// Boilerplate that must never become a description.
    fn is_excluded_description(&self, description: &str) -> bool;

    /// Income/expense from description marker words.
    fn direction(&self, description: &str) -> Direction;
}

/// Names of the built-in layouts.
pub const LAYOUT_NAMES: &[&str] = &[BbvaMx::NAME];

pub fn layout_by_name(name: &str) -> Result<Box<dyn StatementLayout>> {
    match name.to_lowercase().as_str() {
        BbvaMx::NAME | "bbva" => Ok(Box::new(BbvaMx::new()?)),
        other => Err(IngestError::UnknownLayout(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(layout_by_name("bbva-mx").unwrap().name(), "bbva-mx");
        assert_eq!(layout_by_name("BBVA").unwrap().name(), "bbva-mx");
        assert!(matches!(
            layout_by_name("chase"),
            Err(IngestError::UnknownLayout(_))
        ));
    }
}
