//! Tests for the rule runner against the in-memory store.

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use feedloop_core::{compute_dedup_key, normalize_url, Article, Collection, Feed, Rule};
    use feedloop_storage::MemoryStore;

    use crate::error::RunError;
    use crate::runner::run_rule;

    /// Helper to build a minimal active rule for testing.
    fn make_rule(id: i64, user_id: i64) -> Rule {
        let now = Utc::now();
        Rule {
            id,
            user_id,
            name: format!("Rule {}", id),
            include_keywords: None,
            exclude_keywords: None,
            collection_id: None,
            frequency_minutes: 15,
            last_run_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_article(id: i64, feed_id: i64, title: &str) -> Article {
        let now = Utc::now();
        let guid = format!("guid-{}", id);
        let dedup_key = compute_dedup_key(Some(&guid), None).unwrap();
        Article {
            id,
            feed_id,
            title: title.to_string(),
            url: None,
            guid: Some(guid),
            published_at: Some(now),
            summary: None,
            content: None,
            author: None,
            dedup_key,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_feed(id: i64, url: &str) -> Feed {
        let now = Utc::now();
        Feed {
            id,
            url: normalize_url(url),
            title: format!("Feed {}", id),
            site_url: None,
            description: None,
            etag: None,
            last_modified: None,
            last_fetched_at: None,
            failure_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Seed one collection with one linked feed for a user.
    fn seed_scope(store: &MemoryStore, user_id: i64, collection_id: i64, feed_id: i64) {
        let now = Utc::now();
        store.insert_collection(Collection {
            id: collection_id,
            user_id,
            name: format!("Collection {}", collection_id),
            description: None,
            created_at: now,
            updated_at: now,
        });
        store.insert_feed(make_feed(
            feed_id,
            &format!("https://feeds.example.com/{}.xml", feed_id),
        ));
        store.link_feed(collection_id, feed_id);
    }

    // -- error cases -------------------------------------------------------

    #[tokio::test]
    async fn missing_rule_is_not_found() {
        let store = MemoryStore::new();
        let err = run_rule(&store, 42).await.unwrap_err();
        assert!(matches!(err, RunError::RuleNotFound(42)));
    }

    // -- candidate scoping -------------------------------------------------

    #[tokio::test]
    async fn unscoped_rule_sees_only_the_owners_articles() {
        let store = MemoryStore::new();
        seed_scope(&store, 1, 10, 100);
        seed_scope(&store, 2, 20, 200);
        // Identically-matching articles for two different users.
        store.insert_article(make_article(1000, 100, "Rust Weekly"));
        store.insert_article(make_article(2000, 200, "Rust Weekly"));

        let mut rule = make_rule(1, 1);
        rule.include_keywords = Some("rust".to_string());
        store.insert_rule(rule);

        let report = run_rule(&store, 1).await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.matched, 1);
        assert_eq!(report.created, 1);

        let matched: Vec<i64> = store
            .matches_for_rule(1)
            .iter()
            .map(|m| m.article_id)
            .collect();
        assert_eq!(matched, vec![1000]);
    }

    #[tokio::test]
    async fn scoped_rule_is_limited_to_its_collection() {
        let store = MemoryStore::new();
        // One user, two collections.
        seed_scope(&store, 1, 10, 100);
        seed_scope(&store, 1, 11, 101);
        store.insert_article(make_article(1000, 100, "Rust in collection ten"));
        store.insert_article(make_article(1001, 101, "Rust in collection eleven"));

        let mut rule = make_rule(1, 1);
        rule.include_keywords = Some("rust".to_string());
        rule.collection_id = Some(10);
        store.insert_rule(rule);

        let report = run_rule(&store, 1).await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.created, 1);
        assert_eq!(store.matches_for_rule(1)[0].article_id, 1000);
    }

    #[tokio::test]
    async fn empty_scope_yields_zero_candidates() {
        let store = MemoryStore::new();
        // Rule owner has no collections at all.
        store.insert_rule(make_rule(1, 1));

        let report = run_rule(&store, 1).await.unwrap();
        assert_eq!(report.candidates, 0);
        assert_eq!(report.matched, 0);
        assert_eq!(report.created, 0);
        assert_eq!(report.skipped, 0);
        // A run over zero candidates still counts as a successful run.
        assert!(store.rule(1).unwrap().last_run_at.is_some());
    }

    // -- idempotency -------------------------------------------------------

    #[tokio::test]
    async fn rerun_creates_nothing_new() {
        let store = MemoryStore::new();
        seed_scope(&store, 1, 10, 100);
        store.insert_article(make_article(1000, 100, "Rust Weekly"));
        store.insert_article(make_article(1001, 100, "More Rust"));
        store.insert_rule(make_rule(1, 1));

        let first = run_rule(&store, 1).await.unwrap();
        assert_eq!(first.created, 2);
        assert_eq!(first.skipped, 0);

        let second = run_rule(&store, 1).await.unwrap();
        assert_eq!(second.matched, 2);
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.matched, second.created + second.skipped);
        assert_eq!(store.match_count(), 2);
    }

    #[tokio::test]
    async fn two_rules_match_the_same_article_independently() {
        let store = MemoryStore::new();
        seed_scope(&store, 1, 10, 100);
        store.insert_article(make_article(1000, 100, "Rust Weekly"));
        store.insert_rule(make_rule(1, 1));
        store.insert_rule(make_rule(2, 1));

        assert_eq!(run_rule(&store, 1).await.unwrap().created, 1);
        assert_eq!(run_rule(&store, 2).await.unwrap().created, 1);
        // No cross-rule uniqueness: one row per rule.
        assert_eq!(store.match_count(), 2);
    }

    // -- side effects ------------------------------------------------------

    #[tokio::test]
    async fn last_run_is_set_even_when_nothing_matches() {
        let store = MemoryStore::new();
        seed_scope(&store, 1, 10, 100);
        store.insert_article(make_article(1000, 100, "Gardening tips"));

        let mut rule = make_rule(1, 1);
        rule.include_keywords = Some("rust".to_string());
        store.insert_rule(rule);

        let report = run_rule(&store, 1).await.unwrap();
        assert_eq!(report.matched, 0);
        assert!(store.rule(1).unwrap().last_run_at.is_some());
    }

    #[tokio::test]
    async fn failed_commit_applies_no_effects() {
        let store = MemoryStore::new();
        seed_scope(&store, 1, 10, 100);
        store.insert_article(make_article(1000, 100, "Rust Weekly"));
        store.insert_rule(make_rule(1, 1));
        store.fail_commits_for(1);

        let err = run_rule(&store, 1).await.unwrap_err();
        assert!(matches!(err, RunError::Storage(_)));
        assert_eq!(store.match_count(), 0);
        assert!(store.rule(1).unwrap().last_run_at.is_none());
    }

    // -- matching through the runner ---------------------------------------

    #[tokio::test]
    async fn exclude_keywords_veto_through_the_runner() {
        let store = MemoryStore::new();
        seed_scope(&store, 1, 10, 100);
        store.insert_article(make_article(1000, 100, "Python for Beginners"));
        store.insert_article(make_article(1001, 100, "Python internals"));

        let mut rule = make_rule(1, 1);
        rule.include_keywords = Some("python".to_string());
        rule.exclude_keywords = Some("beginner".to_string());
        store.insert_rule(rule);

        let report = run_rule(&store, 1).await.unwrap();
        assert_eq!(report.candidates, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(store.matches_for_rule(1)[0].article_id, 1001);
    }
}
