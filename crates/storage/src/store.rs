//! The [`RuleStore`] contract between the rule engine and persistence.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use feedloop_core::{Article, Rule};

use crate::error::StorageError;

/// Persistence operations a single rule run needs.
///
/// All timestamps cross this boundary as `DateTime<Utc>`; implementations
/// are responsible for normalizing whatever the backend persists to UTC so
/// due-time arithmetic upstream never mixes references.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Load one rule, or `None` if no rule with that id exists.
    async fn rule_by_id(&self, rule_id: i64) -> Result<Option<Rule>, StorageError>;

    /// All rules eligible for scheduling: active with a positive interval.
    /// The scheduler applies the time-based due predicate in-process.
    async fn schedulable_rules(&self) -> Result<Vec<Rule>, StorageError>;

    /// Resolve a rule's candidate articles by scope.
    ///
    /// With an explicit `collection_id`, candidates are the articles of
    /// feeds linked to that collection. Without one, candidates come from
    /// feeds in any collection owned by the rule's user — articles carry no
    /// user reference, so isolation rests entirely on this traversal.
    /// An empty resolved scope yields an empty set, not an error.
    async fn candidate_articles(&self, rule: &Rule) -> Result<Vec<Article>, StorageError>;

    /// Which of the given articles already have a match for this rule.
    async fn existing_match_ids(
        &self,
        rule_id: i64,
        article_ids: &[i64],
    ) -> Result<HashSet<i64>, StorageError>;

    /// Persist one run's effects atomically: insert matches for
    /// `article_ids` (a uniqueness conflict is skipped, not an error) and
    /// set the rule's `last_run_at` to `now`, in a single transaction.
    ///
    /// Returns the number of match rows actually created, which may be
    /// lower than `article_ids.len()` if a concurrent run got there first.
    async fn commit_run(
        &self,
        rule_id: i64,
        article_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError>;
}
