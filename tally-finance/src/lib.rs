//! tally-finance: batch categorization, the external classifier, and statement export

pub mod categorizer;
pub mod classifier;
pub mod export;
pub mod openai;
pub mod pipeline;
pub mod rate_limit;

pub use categorizer::{
    BatchReport, CategorizationBatchState, CategorizedBatch, Categorizer, CategorizerConfig,
};
pub use classifier::{ClassifierError, TextClassifier};
pub use openai::OpenAiClassifier;
pub use pipeline::{process_statement, ProcessedStatement, StatementSummary};
pub use rate_limit::RateLimiter;
