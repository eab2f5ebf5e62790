//! Keyword rule evaluation and scheduling engine.
//!
//! This crate provides:
//! - A pure, deterministic keyword matcher over article text
//! - A rule runner that records matches idempotently and stamps last-run
//! - A due-rule scheduler with per-rule failure isolation
//!
//! Persistence goes through the `RuleStore` trait in `feedloop-storage`;
//! the engine itself performs no I/O beyond that collaborator.

pub mod error;
pub mod matcher;
pub mod runner;
pub mod scheduler;

pub use error::RunError;
pub use matcher::{matches, ArticleText, RuleCriteria};
pub use runner::{run_rule, RunReport};
pub use scheduler::{due_rules, is_due, run_due, ScheduleReport};
