//! External text-classification collaborator.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tally_core::Category;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("quota exhausted: {0}")]
    Quota(String),

    #[error("not authorized: {0}")]
    Auth(String),

    #[error("classifier error: {0}")]
    Other(String),
}

impl ClassifierError {
    /// Quota and auth failures won't fix themselves within a batch.
    pub fn trips_breaker(&self) -> bool {
        matches!(self, ClassifierError::Quota(_) | ClassifierError::Auth(_))
    }
}

/// Something that can label a transaction with a free-text category.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, description: &str, amount: Decimal) -> Result<String, ClassifierError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

pub const SYSTEM_PROMPT: &str =
    "You are a financial categorization assistant. Always respond with only the category name.";

/// User prompt asking for one of the taxonomy labels.
pub fn classification_prompt(description: &str, amount: Decimal) -> String {
    let mut prompt =
        String::from("Categorize this bank transaction into one of these categories:\n");
    for category in Category::ALL {
        prompt.push_str("- ");
        prompt.push_str(category.label());
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nTransaction description: \"{description}\"\nAmount: {amount}\n\n\
         Respond with ONLY the category name, nothing else."
    ));
    prompt
}
