//! Rule execution: load one rule, evaluate its candidates, record matches.
//!
//! Execution flow:
//! 1. Load the rule (`RuleNotFound` if absent).
//! 2. Resolve candidate articles by scope through the store.
//! 3. Apply the matcher to every candidate; order never affects outcome.
//! 4. Commit new matches and the last-run stamp as one transaction.
//!
//! Runs are idempotent: `(rule, article)` match pairs are unique, so
//! re-running a rule against an unchanged article set creates zero rows.
//! Matches that already exist — or that a concurrent run inserted first —
//! count as `skipped`.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use feedloop_storage::RuleStore;

use crate::error::RunError;
use crate::matcher::{self, ArticleText, RuleCriteria};

#[cfg(test)]
mod tests;

/// Counters from one rule run. `matched == created + skipped` always.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunReport {
    pub rule_id: i64,
    /// Articles considered after scope resolution.
    pub candidates: usize,
    /// Candidates that satisfied the keyword criteria.
    pub matched: usize,
    /// New match rows written by this run.
    pub created: usize,
    /// Matches already present before this run.
    pub skipped: usize,
}

/// Execute a rule against its candidate articles and store matches.
///
/// On success the rule's `last_run_at` is set to the current time even if
/// nothing matched. On failure no effects are applied at all: the store
/// commits matches and the last-run stamp together or not at all, so a
/// failed rule is naturally retried on the next scheduling pass.
pub async fn run_rule<S: RuleStore + ?Sized>(
    store: &S,
    rule_id: i64,
) -> Result<RunReport, RunError> {
    let rule = store
        .rule_by_id(rule_id)
        .await?
        .ok_or(RunError::RuleNotFound(rule_id))?;

    let candidates = store.candidate_articles(&rule).await?;

    let criteria = RuleCriteria::from(&rule);
    let matched_ids: Vec<i64> = candidates
        .iter()
        .filter(|article| matcher::matches(&criteria, &ArticleText::from(*article)))
        .map(|article| article.id)
        .collect();

    let existing = store.existing_match_ids(rule_id, &matched_ids).await?;
    let to_create: Vec<i64> = matched_ids
        .iter()
        .copied()
        .filter(|id| !existing.contains(id))
        .collect();

    let now = Utc::now();
    // The store may create fewer rows than requested if a concurrent run
    // raced us to an insert; those fold into `skipped` like pre-existing
    // matches.
    let created = store.commit_run(rule_id, &to_create, now).await? as usize;
    let skipped = matched_ids.len() - created;

    let report = RunReport {
        rule_id,
        candidates: candidates.len(),
        matched: matched_ids.len(),
        created,
        skipped,
    };

    info!(
        rule_id,
        candidates = report.candidates,
        matched = report.matched,
        created = report.created,
        skipped = report.skipped,
        "rule run completed"
    );

    Ok(report)
}
