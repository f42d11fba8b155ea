//! Recommendation generation.
//!
//! A deterministic rule table ([`RULES`]) is evaluated against the dataset
//! profile by the [`RecommendationEngine`]. Thresholds come from
//! [`ProfilingConfig`](crate::ProfilingConfig); the rules themselves are
//! plain data.

mod rule_engine;
mod rules;

pub use rule_engine::RecommendationEngine;
pub use rules::{RULES, Rule, RuleContext, TemplateVars, Trigger, render};
