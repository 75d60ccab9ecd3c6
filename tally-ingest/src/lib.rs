//! tally-ingest: statement text sources, bank layouts and transaction extraction.

pub mod classifier;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod layout;
pub mod parsers;
pub mod section;
pub mod source;
pub mod types;

pub use classifier::{LineClassifier, Rule};
pub use dates::DateResolver;
pub use error::IngestError;
pub use extractor::{ParserState, TransactionExtractor};
pub use layout::{layout_by_name, StatementLayout, LAYOUT_NAMES};
pub use parsers::BbvaMx;
pub use section::SectionTracker;
pub use source::{InMemoryPages, PageSource, TextFileSource};
pub use types::{LineKind, ParsedLine, SectionState};
