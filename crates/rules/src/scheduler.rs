//! Due-rule scheduling over persisted rules.
//!
//! A rule is due when it is active, its interval is a positive number of
//! minutes, and it either never ran or last ran at least that interval
//! ago. The interval boundary is closed: exactly-at-interval counts as
//! due.
//!
//! Batch execution isolates failures per rule — one broken rule is
//! caught, logged, and counted, and the pass continues. Because the
//! runner commits a run's effects atomically, a failed rule keeps its
//! previous `last_run_at` and is retried on the next pass rather than
//! silently skipped forever.
//!
//! All comparisons happen in UTC; the store hands out `DateTime<Utc>`
//! exclusively, so naive-vs-aware drift cannot occur here.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use feedloop_core::Rule;
use feedloop_storage::{RuleStore, StorageError};

use crate::runner::run_rule;


/// Counters from one scheduling pass.
/// `rules_due == rules_run + failures` always.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScheduleReport {
    pub rules_due: usize,
    pub rules_run: usize,
    pub failures: usize,
}

/// Whether a single rule is due at `now`.
pub fn is_due(rule: &Rule, now: DateTime<Utc>) -> bool {
    if !rule.is_active || rule.frequency_minutes <= 0 {
        return false;
    }
    match rule.last_run_at {
        // Never run: due immediately.
        None => true,
        Some(last_run) => {
            let elapsed = now.signed_duration_since(last_run);
            elapsed >= Duration::minutes(i64::from(rule.frequency_minutes))
        }
    }
}

/// All rules due for execution at `now`. The result is an unordered set;
/// callers must not rely on execution order.
pub async fn due_rules<S: RuleStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<Vec<Rule>, StorageError> {
    let candidates = store.schedulable_rules().await?;
    let candidate_count = candidates.len();

    let due: Vec<Rule> = candidates
        .into_iter()
        .filter(|rule| is_due(rule, now))
        .collect();

    debug!(
        candidates = candidate_count,
        due = due.len(),
        "due rules check completed"
    );

    Ok(due)
}

/// Run every due rule, isolating per-rule failures.
///
/// Only errors from the due-rules query itself propagate; anything a
/// single rule's run raises is folded into the failure counter.
pub async fn run_due<S: RuleStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<ScheduleReport, StorageError> {
    let due = due_rules(store, now).await?;
    let rules_due = due.len();

    let mut rules_run = 0;
    let mut failures = 0;

    for rule in &due {
        match run_rule(store, rule.id).await {
            Ok(_) => rules_run += 1,
            Err(e) => {
                failures += 1;
                warn!(
                    rule_id = rule.id,
                    rule_name = %rule.name,
                    error = %e,
                    "scheduled rule failed; continuing"
                );
            }
        }
    }

    info!(rules_due, rules_run, failures, "scheduling pass completed");

    Ok(ScheduleReport {
        rules_due,
        rules_run,
        failures,
    })
}
