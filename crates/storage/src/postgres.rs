//! PostgreSQL-backed [`RuleStore`].
//!
//! Expects the web layer's schema: `rules`, `articles`, `collections`,
//! `collection_feeds`, and `rule_matches` with a unique constraint on
//! `(rule_id, article_id)`. All timestamp columns are `timestamptz`, so
//! values arrive here already normalized to UTC.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use feedloop_core::config::PostgresConfig;
use feedloop_core::{Article, Rule};

use crate::error::StorageError;
use crate::store::RuleStore;

pub struct PgRuleStore {
    pool: PgPool,
}

impl PgRuleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a fresh pool from config.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RuleStore for PgRuleStore {
    async fn rule_by_id(&self, rule_id: i64) -> Result<Option<Rule>, StorageError> {
        let rule = sqlx::query_as::<_, Rule>(
            "SELECT id, user_id, name, include_keywords, exclude_keywords,
                    collection_id, frequency_minutes, last_run_at, is_active,
                    created_at, updated_at
             FROM rules WHERE id = $1",
        )
        .bind(rule_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rule)
    }

    async fn schedulable_rules(&self) -> Result<Vec<Rule>, StorageError> {
        let rules = sqlx::query_as::<_, Rule>(
            "SELECT id, user_id, name, include_keywords, exclude_keywords,
                    collection_id, frequency_minutes, last_run_at, is_active,
                    created_at, updated_at
             FROM rules
             WHERE is_active AND frequency_minutes > 0",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    async fn candidate_articles(&self, rule: &Rule) -> Result<Vec<Article>, StorageError> {
        // Scope resolution mirrors the ownership chain: an explicit
        // collection, or every collection the rule's user owns.
        let articles = match rule.collection_id {
            Some(collection_id) => {
                sqlx::query_as::<_, Article>(
                    "SELECT a.id, a.feed_id, a.title, a.url, a.guid, a.published_at,
                            a.summary, a.content, a.author, a.dedup_key,
                            a.created_at, a.updated_at
                     FROM articles a
                     WHERE a.feed_id IN (
                         SELECT cf.feed_id FROM collection_feeds cf
                         WHERE cf.collection_id = $1
                     )",
                )
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Article>(
                    "SELECT a.id, a.feed_id, a.title, a.url, a.guid, a.published_at,
                            a.summary, a.content, a.author, a.dedup_key,
                            a.created_at, a.updated_at
                     FROM articles a
                     WHERE a.feed_id IN (
                         SELECT cf.feed_id FROM collection_feeds cf
                         WHERE cf.collection_id IN (
                             SELECT c.id FROM collections c WHERE c.user_id = $1
                         )
                     )",
                )
                .bind(rule.user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(
            rule_id = rule.id,
            candidates = articles.len(),
            "resolved candidate articles"
        );
        Ok(articles)
    }

    async fn existing_match_ids(
        &self,
        rule_id: i64,
        article_ids: &[i64],
    ) -> Result<HashSet<i64>, StorageError> {
        if article_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT article_id FROM rule_matches
             WHERE rule_id = $1 AND article_id = ANY($2)",
        )
        .bind(rule_id)
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn commit_run(
        &self,
        rule_id: i64,
        article_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;

        let created = if article_ids.is_empty() {
            0
        } else {
            // ON CONFLICT DO NOTHING folds races with a concurrent run of the
            // same rule into "already matched".
            sqlx::query(
                "INSERT INTO rule_matches (rule_id, article_id, matched_at)
                 SELECT $1::bigint, article_id, $3::timestamptz
                 FROM UNNEST($2::bigint[]) AS article_id
                 ON CONFLICT (rule_id, article_id) DO NOTHING",
            )
            .bind(rule_id)
            .bind(article_ids)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        };

        sqlx::query("UPDATE rules SET last_run_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(rule_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }
}
