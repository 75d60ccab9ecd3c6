//! Batch categorization: keyword rules first, an external classifier second.
//!
//! The external classifier is only consulted for the first `call_cap`
//! transactions of a batch, one call at a time, spaced by the rate limiter.
//! A quota or auth failure switches it off for the rest of the batch.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_core::{categorize, Category, TransactionCandidate};
use tracing::{debug, info, warn};

use crate::classifier::{ClassifierError, TextClassifier};
use crate::rate_limit::RateLimiter;

pub const DEFAULT_CALL_CAP: usize = 10;
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorizerConfig {
    /// Whether to consult the external classifier at all
    pub ai_enabled: bool,
    /// Most external calls made per batch
    pub call_cap: usize,
    /// Gap between the end of one external call and the start of the next
    pub call_delay: Duration,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            ai_enabled: false,
            call_cap: DEFAULT_CALL_CAP,
            call_delay: DEFAULT_CALL_DELAY,
        }
    }
}

/// Per-batch enhancement switch and call budget. Never outlives one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizationBatchState {
    pub ai_enabled: bool,
    pub ai_calls_made: usize,
    pub ai_call_cap: usize,
}

impl CategorizationBatchState {
    pub fn new(ai_enabled: bool, ai_call_cap: usize) -> Self {
        Self {
            ai_enabled,
            ai_calls_made: 0,
            ai_call_cap,
        }
    }

    /// Whether the next item may go to the external classifier.
    pub fn admits(&self) -> bool {
        self.ai_enabled && self.ai_calls_made < self.ai_call_cap
    }

    /// Turn the enhancement off for good.
    pub fn trip(&mut self) {
        self.ai_enabled = false;
    }
}

/// What happened during a batch, for logs and the CLI report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub ai_calls_made: usize,
    /// External labels that mapped onto the taxonomy
    pub ai_accepted: usize,
    /// External labels that didn't, keyword result kept
    pub ai_unmapped: usize,
    /// Failed calls, breaker-tripping ones included
    pub ai_errors: usize,
    /// Error that switched the enhancement off, if any
    pub breaker_tripped: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedBatch {
    pub transactions: Vec<TransactionCandidate>,
    pub report: BatchReport,
}

pub struct Categorizer<'a> {
    classifier: Option<&'a dyn TextClassifier>,
    config: CategorizerConfig,
}

impl<'a> Categorizer<'a> {
    /// Deterministic keyword rules only.
    pub fn keyword_only() -> Self {
        Self {
            classifier: None,
            config: CategorizerConfig::default(),
        }
    }

    pub fn with_classifier(classifier: &'a dyn TextClassifier, config: CategorizerConfig) -> Self {
        Self {
            classifier: Some(classifier),
            config,
        }
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    /// Categorize a whole batch.
    ///
    /// Input is only borrowed and results come back in one piece, so dropping
    /// the future part-way leaves the caller's transactions untouched.
    pub async fn categorize_batch(&self, candidates: &[TransactionCandidate]) -> CategorizedBatch {
        let mut state = CategorizationBatchState::new(
            self.config.ai_enabled && self.classifier.is_some(),
            self.config.call_cap,
        );
        let mut limiter = RateLimiter::new(self.config.call_delay);
        let mut report = BatchReport::default();
        let mut transactions = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let keyword = categorize(&candidate.description);
            let category = match self.classifier {
                Some(classifier) if state.admits() => {
                    let outcome = {
                        let _permit = limiter.acquire().await;
                        state.ai_calls_made += 1;
                        classifier
                            .classify(&candidate.description, candidate.amount)
                            .await
                    };
                    self.resolve(outcome, keyword, candidate, &mut state, &mut report, classifier.name())
                }
                _ => keyword,
            };

            let mut txn = candidate.clone();
            txn.category = category;
            transactions.push(txn);
        }

        report.ai_calls_made = state.ai_calls_made;
        info!(
            transactions = transactions.len(),
            ai_calls = report.ai_calls_made,
            ai_accepted = report.ai_accepted,
            ai_errors = report.ai_errors,
            breaker_tripped = report.breaker_tripped.is_some(),
            "categorized batch"
        );

        CategorizedBatch {
            transactions,
            report,
        }
    }

    fn resolve(
        &self,
        outcome: Result<String, ClassifierError>,
        keyword: Category,
        candidate: &TransactionCandidate,
        state: &mut CategorizationBatchState,
        report: &mut BatchReport,
        classifier: &str,
    ) -> Category {
        match outcome {
            Ok(label) => match Category::from_label(&label) {
                Some(category) => {
                    report.ai_accepted += 1;
                    debug!(description = %candidate.description, %label, %category, "external label accepted");
                    category
                }
                None => {
                    report.ai_unmapped += 1;
                    debug!(description = %candidate.description, %label, %keyword, "external label unmapped");
                    keyword
                }
            },
            Err(err) if err.trips_breaker() => {
                report.ai_errors += 1;
                report.breaker_tripped = Some(err.to_string());
                state.trip();
                warn!(classifier, error = %err, "disabling external classifier for the rest of the batch");
                keyword
            }
            Err(err) => {
                report.ai_errors += 1;
                warn!(classifier, error = %err, description = %candidate.description, "external classification failed, using keyword category");
                keyword
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use tally_core::Direction;

    /// Replays canned answers in order, recording what it was asked.
    struct Scripted {
        answers: Mutex<Vec<Result<String, ClassifierError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(mut answers: Vec<Result<String, ClassifierError>>) -> Self {
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextClassifier for Scripted {
        async fn classify(&self, description: &str, _amount: Decimal) -> Result<String, ClassifierError> {
            self.seen.lock().unwrap().push(description.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("Entertainment".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn txn(description: &str) -> TransactionCandidate {
        TransactionCandidate::new(
            NaiveDate::from_ymd_opt(2024, 9, 5).unwrap(),
            description,
            Decimal::new(10000, 2),
            Direction::Expense,
            categorize(description),
            description,
        )
    }

    fn enabled(cap: usize) -> CategorizerConfig {
        CategorizerConfig {
            ai_enabled: true,
            call_cap: cap,
            call_delay: Duration::from_millis(100),
        }
    }

    fn categories(batch: &CategorizedBatch) -> Vec<Category> {
        batch.transactions.iter().map(|t| t.category).collect()
    }

    #[tokio::test]
    async fn test_keyword_only() {
        let input = vec![txn("OXXO CENTRO"), txn("UBER VIAJE"), txn("LIVERPOOL CENTRO")];
        let batch = Categorizer::keyword_only().categorize_batch(&input).await;
        assert_eq!(
            categories(&batch),
            vec![Category::Food, Category::Transportation, Category::PersonalShopping]
        );
        assert_eq!(batch.report, BatchReport::default());
    }

    #[tokio::test]
    async fn test_disabled_config_never_calls_out() {
        let scripted = Scripted::new(vec![]);
        let config = CategorizerConfig { ai_enabled: false, ..enabled(10) };
        let categorizer = Categorizer::with_classifier(&scripted, config);
        let batch = categorizer.categorize_batch(&[txn("OXXO CENTRO")]).await;
        assert_eq!(categories(&batch), vec![Category::Food]);
        assert!(scripted.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cap_limits_external_calls() {
        let scripted = Scripted::new(vec![]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(2));
        let input = vec![txn("OXXO CENTRO"), txn("UBER VIAJE"), txn("LIVERPOOL CENTRO")];
        let batch = categorizer.categorize_batch(&input).await;

        assert_eq!(scripted.seen(), vec!["OXXO CENTRO", "UBER VIAJE"]);
        assert_eq!(
            categories(&batch),
            vec![Category::Entertainment, Category::Entertainment, Category::PersonalShopping]
        );
        assert_eq!(batch.report.ai_calls_made, 2);
        assert_eq!(batch.report.ai_accepted, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmapped_label_keeps_keyword_result() {
        let scripted = Scripted::new(vec![Ok("Groceries".into()), Ok("  food. ".into())]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(10));
        let input = vec![txn("UBER VIAJE"), txn("LIVERPOOL CENTRO")];
        let batch = categorizer.categorize_batch(&input).await;
        assert_eq!(categories(&batch), vec![Category::Transportation, Category::Food]);
        assert_eq!(batch.report.ai_unmapped, 1);
        assert_eq!(batch.report.ai_accepted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_error_trips_breaker() {
        let scripted = Scripted::new(vec![
            Ok("Entertainment".into()),
            Err(ClassifierError::Quota("429 insufficient_quota".into())),
            // would succeed, but must never be asked
            Ok("Entertainment".into()),
        ]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(10));
        let input = vec![
            txn("LIVERPOOL CENTRO"),
            txn("OXXO CENTRO"),
            txn("UBER VIAJE"),
            txn("NETFLIX.COM"),
        ];
        let batch = categorizer.categorize_batch(&input).await;

        assert_eq!(scripted.seen(), vec!["LIVERPOOL CENTRO", "OXXO CENTRO"]);
        assert_eq!(
            categories(&batch),
            vec![
                Category::Entertainment,
                Category::Food,
                Category::Transportation,
                Category::PaymentsRecurring,
            ]
        );
        assert_eq!(batch.report.ai_calls_made, 2);
        assert_eq!(batch.report.ai_errors, 1);
        assert!(batch.report.breaker_tripped.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_trips_breaker() {
        let scripted = Scripted::new(vec![Err(ClassifierError::Auth("401".into()))]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(10));
        let input = vec![txn("OXXO CENTRO"), txn("UBER VIAJE")];
        let batch = categorizer.categorize_batch(&input).await;
        assert_eq!(scripted.seen().len(), 1);
        assert_eq!(categories(&batch), vec![Category::Food, Category::Transportation]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_error_falls_back_and_continues() {
        let scripted = Scripted::new(vec![
            Err(ClassifierError::Other("timeout".into())),
            Ok("Entertainment".into()),
        ]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(10));
        let input = vec![txn("OXXO CENTRO"), txn("UBER VIAJE")];
        let batch = categorizer.categorize_batch(&input).await;
        assert_eq!(categories(&batch), vec![Category::Food, Category::Entertainment]);
        assert_eq!(batch.report.ai_errors, 1);
        assert_eq!(batch.report.breaker_tripped, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced_by_delay() {
        let scripted = Scripted::new(vec![]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(10));
        let input = vec![txn("OXXO CENTRO"), txn("UBER VIAJE"), txn("NETFLIX.COM")];
        let start = tokio::time::Instant::now();
        categorizer.categorize_batch(&input).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_batch_leaves_input_untouched() {
        let scripted = Scripted::new(vec![]);
        let categorizer = Categorizer::with_classifier(&scripted, enabled(10));
        let input = vec![txn("OXXO CENTRO"), txn("UBER VIAJE"), txn("NETFLIX.COM")];
        let before = input.clone();

        let result = tokio::time::timeout(
            Duration::from_millis(150),
            categorizer.categorize_batch(&input),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(input, before);
    }

    #[test]
    fn test_batch_state_admission() {
        let mut state = CategorizationBatchState::new(true, 2);
        assert!(state.admits());
        state.ai_calls_made = 2;
        assert!(!state.admits());

        let mut state = CategorizationBatchState::new(true, 10);
        state.trip();
        assert!(!state.admits());
    }
}
