//! In-memory [`RuleStore`] for tests and local experimentation.
//!
//! Holds the same record shapes as the PostgreSQL backend in plain
//! collections behind one mutex, so a commit is naturally atomic. Commit
//! failures can be injected per rule to exercise the scheduler's
//! partial-failure handling.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use feedloop_core::{Article, Collection, CollectionFeed, Feed, Rule, RuleMatch};

use crate::error::StorageError;
use crate::store::RuleStore;

#[derive(Default)]
struct Inner {
    rules: Vec<Rule>,
    collections: Vec<Collection>,
    feeds: Vec<Feed>,
    links: Vec<CollectionFeed>,
    articles: Vec<Article>,
    matches: Vec<RuleMatch>,
    next_match_id: i64,
    /// Rule ids whose `commit_run` should fail with `Unavailable`.
    fail_commits_for: HashSet<i64>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding ─────────────────────────────────────────────────────

    pub fn insert_rule(&self, rule: Rule) {
        self.inner.lock().unwrap().rules.push(rule);
    }

    pub fn insert_collection(&self, collection: Collection) {
        self.inner.lock().unwrap().collections.push(collection);
    }

    pub fn insert_feed(&self, feed: Feed) {
        self.inner.lock().unwrap().feeds.push(feed);
    }

    pub fn link_feed(&self, collection_id: i64, feed_id: i64) {
        self.inner.lock().unwrap().links.push(CollectionFeed {
            collection_id,
            feed_id,
        });
    }

    pub fn insert_article(&self, article: Article) {
        self.inner.lock().unwrap().articles.push(article);
    }

    /// Make every `commit_run` for this rule fail until further notice.
    pub fn fail_commits_for(&self, rule_id: i64) {
        self.inner.lock().unwrap().fail_commits_for.insert(rule_id);
    }

    // ── Inspection ──────────────────────────────────────────────────

    pub fn rule(&self, rule_id: i64) -> Option<Rule> {
        self.inner
            .lock()
            .unwrap()
            .rules
            .iter()
            .find(|r| r.id == rule_id)
            .cloned()
    }

    pub fn matches_for_rule(&self, rule_id: i64) -> Vec<RuleMatch> {
        self.inner
            .lock()
            .unwrap()
            .matches
            .iter()
            .filter(|m| m.rule_id == rule_id)
            .cloned()
            .collect()
    }

    pub fn match_count(&self) -> usize {
        self.inner.lock().unwrap().matches.len()
    }
}

impl Inner {
    fn feed_ids_in_scope(&self, rule: &Rule) -> HashSet<i64> {
        match rule.collection_id {
            Some(collection_id) => self
                .links
                .iter()
                .filter(|l| l.collection_id == collection_id)
                .map(|l| l.feed_id)
                .collect(),
            None => {
                let owned: HashSet<i64> = self
                    .collections
                    .iter()
                    .filter(|c| c.user_id == rule.user_id)
                    .map(|c| c.id)
                    .collect();
                self.links
                    .iter()
                    .filter(|l| owned.contains(&l.collection_id))
                    .map(|l| l.feed_id)
                    .collect()
            }
        }
    }

    fn has_match(&self, rule_id: i64, article_id: i64) -> bool {
        self.matches
            .iter()
            .any(|m| m.rule_id == rule_id && m.article_id == article_id)
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn rule_by_id(&self, rule_id: i64) -> Result<Option<Rule>, StorageError> {
        Ok(self.rule(rule_id))
    }

    async fn schedulable_rules(&self) -> Result<Vec<Rule>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rules
            .iter()
            .filter(|r| r.is_active && r.frequency_minutes > 0)
            .cloned()
            .collect())
    }

    async fn candidate_articles(&self, rule: &Rule) -> Result<Vec<Article>, StorageError> {
        let inner = self.inner.lock().unwrap();
        let feed_ids = inner.feed_ids_in_scope(rule);
        Ok(inner
            .articles
            .iter()
            .filter(|a| feed_ids.contains(&a.feed_id))
            .cloned()
            .collect())
    }

    async fn existing_match_ids(
        &self,
        rule_id: i64,
        article_ids: &[i64],
    ) -> Result<HashSet<i64>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(article_ids
            .iter()
            .copied()
            .filter(|&id| inner.has_match(rule_id, id))
            .collect())
    }

    async fn commit_run(
        &self,
        rule_id: i64,
        article_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().unwrap();

        // Fail before any mutation so an injected failure leaves neither
        // matches nor a moved last_run_at, like a rolled-back transaction.
        if inner.fail_commits_for.contains(&rule_id) {
            return Err(StorageError::Unavailable(format!(
                "injected commit failure for rule {}",
                rule_id
            )));
        }

        let mut created = 0u64;
        for &article_id in article_ids {
            if inner.has_match(rule_id, article_id) {
                continue;
            }
            inner.next_match_id += 1;
            let id = inner.next_match_id;
            inner.matches.push(RuleMatch {
                id,
                rule_id,
                article_id,
                matched_at: now,
            });
            created += 1;
        }

        if let Some(rule) = inner.rules.iter_mut().find(|r| r.id == rule_id) {
            rule.last_run_at = Some(now);
            rule.updated_at = now;
        }

        Ok(created)
    }
}
