//! Rule-based recommendation engine.

use super::rules::{RULES, Rule, RuleContext, Trigger, render};
use crate::config::ProfilingConfig;
use crate::profiler::DatasetProfile;
use crate::types::Recommendation;
use tracing::{debug, info};

/// Maps dataset statistics to an ordered list of [`Recommendation`]s.
///
/// The engine is a pure function of its inputs: the same profile and
/// configuration always yield the same recommendations in the same order.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine<'a> {
    config: &'a ProfilingConfig,
    rules: &'a [Rule],
}

impl<'a> RecommendationEngine<'a> {
    /// Create an engine over the built-in rule table.
    pub fn new(config: &'a ProfilingConfig) -> Self {
        Self {
            config,
            rules: RULES,
        }
    }

    /// Create an engine over a custom rule table.
    pub fn with_rules(config: &'a ProfilingConfig, rules: &'a [Rule]) -> Self {
        Self { config, rules }
    }

    /// Evaluate every rule and return the fired recommendations.
    ///
    /// Recommendations are produced in firing order (rule table order, then
    /// column order for per-column rules) and then stably grouped by
    /// severity: critical, warning, info, success.
    pub fn recommend(&self, profile: &DatasetProfile) -> Vec<Recommendation> {
        if profile.insights.row_count == 0 {
            return Vec::new();
        }

        let ctx = RuleContext {
            insights: &profile.insights,
            columns: &profile.columns,
            config: self.config,
        };

        let mut recommendations = Vec::new();
        for rule in self.rules {
            match rule.trigger {
                Trigger::Column(trigger) => {
                    for column in ctx.columns {
                        if let Some(mut vars) = trigger(column, &ctx) {
                            vars.push(("column", column.name.clone()));
                            debug!(rule = rule.name, column = %column.name, "Rule fired");
                            recommendations.push(fire(rule, &vars, recommendations.len()));
                        }
                    }
                }
                Trigger::Dataset(trigger) => {
                    if let Some(vars) = trigger(&ctx) {
                        debug!(rule = rule.name, "Rule fired");
                        recommendations.push(fire(rule, &vars, recommendations.len()));
                    }
                }
            }
        }

        // Vec::sort_by_key is stable, so firing order survives within a severity.
        recommendations.sort_by_key(|r| r.kind.priority());

        info!(
            count = recommendations.len(),
            critical = recommendations.iter().filter(|r| r.kind.priority() == 0).count(),
            "Generated recommendations"
        );
        recommendations
    }
}

fn fire(rule: &Rule, vars: &[(&'static str, String)], ordinal: usize) -> Recommendation {
    Recommendation {
        kind: rule.kind,
        category: rule.category,
        title: render(rule.title, vars),
        description: render(rule.description, vars),
        action: render(rule.action, vars),
        ordinal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ColumnProfile, Insights, MemoryPolicy, MissingInfo, NumericRange,
        RecommendationCategory, RecommendationType, SemanticType,
    };
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn column(name: &str, semantic_type: SemanticType, missing_pct: f64, rows: usize) -> ColumnProfile {
        let missing_count = (missing_pct / 100.0 * rows as f64).round() as usize;
        ColumnProfile {
            name: name.to_string(),
            semantic_type,
            missing_count,
            missing_percentage: missing_pct,
            distinct_count: (rows / 2).max(2),
            numeric_range: None,
            formatted_numeric: false,
            date_like_sample: false,
        }
    }

    fn profile(rows: usize, duplicates: usize, columns: Vec<ColumnProfile>) -> DatasetProfile {
        let mut missing_data = IndexMap::new();
        let mut data_types = IndexMap::new();
        let mut missing_cells = 0;
        for c in &columns {
            if c.missing_count > 0 {
                missing_data.insert(
                    c.name.clone(),
                    MissingInfo {
                        count: c.missing_count,
                        percentage: c.missing_percentage,
                    },
                );
            }
            data_types.insert(c.name.clone(), c.semantic_type);
            missing_cells += c.missing_count;
        }
        let total = (rows * columns.len()).max(1);
        DatasetProfile {
            insights: Insights {
                row_count: rows,
                column_count: columns.len(),
                missing_data,
                data_types,
                duplicates,
                memory_usage: 0.5,
                memory_policy: MemoryPolicy::default(),
                completeness: 100.0 - 100.0 * missing_cells as f64 / total as f64,
            },
            columns,
        }
    }

    fn titles(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_missing_thresholds_are_exclusive_upper_bounds() {
        let config = ProfilingConfig::default();
        let p = profile(
            10,
            0,
            vec![
                column("fifty", SemanticType::Integer, 50.0, 10),
                column("ten", SemanticType::Integer, 10.0, 10),
                column("sixty", SemanticType::Integer, 60.0, 10),
            ],
        );

        let recs = RecommendationEngine::new(&config).recommend(&p);
        let missing: Vec<_> = recs
            .iter()
            .filter(|r| r.category == RecommendationCategory::MissingData)
            .map(|r| (r.kind, r.title.as_str()))
            .collect();

        assert_eq!(
            missing,
            vec![
                (RecommendationType::Critical, "High Missing Data in 'sixty'"),
                (RecommendationType::Warning, "Moderate Missing Data in 'fifty'"),
                (RecommendationType::Info, "Low Missing Data in 'ten'"),
            ]
        );
    }

    #[test]
    fn test_duplicates_warning_and_no_good_quality() {
        let config = ProfilingConfig::default();
        let p = profile(10, 1, vec![column("a", SemanticType::Integer, 0.0, 10)]);
        let recs = RecommendationEngine::new(&config).recommend(&p);

        let dup = recs
            .iter()
            .find(|r| r.category == RecommendationCategory::DataQuality)
            .unwrap();
        assert_eq!(dup.kind, RecommendationType::Warning);
        assert_eq!(dup.description, "Found 1 duplicate rows (10.0% of the dataset).");
        assert!(recs.iter().all(|r| r.kind != RecommendationType::Success));
    }

    #[test]
    fn test_good_quality() {
        let config = ProfilingConfig::default();
        let p = profile(10, 0, vec![column("a", SemanticType::Integer, 0.0, 10)]);
        let recs = RecommendationEngine::new(&config).recommend(&p);

        assert_eq!(titles(&recs), vec!["Good Data Quality"]);
        assert_eq!(recs[0].category, RecommendationCategory::OverallQuality);
    }

    #[test]
    fn test_output_grouped_by_severity_and_stable() {
        let config = ProfilingConfig::default();
        let mut low_card = column("city", SemanticType::Categorical, 0.0, 100);
        low_card.distinct_count = 3;
        let mut constant = column("flag", SemanticType::Categorical, 0.0, 100);
        constant.distinct_count = 1;
        let p = profile(
            100,
            0,
            vec![
                column("b", SemanticType::Integer, 5.0, 100),
                low_card,
                column("a", SemanticType::Integer, 80.0, 100),
                constant,
                column("c", SemanticType::Integer, 30.0, 100),
            ],
        );

        let engine = RecommendationEngine::new(&config);
        let recs = engine.recommend(&p);
        let kinds: Vec<_> = recs.iter().map(|r| r.kind.priority()).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);

        // Within a severity, firing order is kept.
        for pair in recs.windows(2) {
            if pair[0].kind == pair[1].kind {
                assert!(pair[0].ordinal < pair[1].ordinal);
            }
        }

        assert_eq!(engine.recommend(&p), recs);
    }

    #[test]
    fn test_cardinality_rules() {
        let config = ProfilingConfig::default();
        let mut ids = column("user_id", SemanticType::Categorical, 0.0, 100);
        ids.distinct_count = 100;
        let mut numeric_ids = column("row", SemanticType::Integer, 0.0, 100);
        numeric_ids.distinct_count = 100;
        let p = profile(100, 0, vec![ids, numeric_ids]);

        let recs = RecommendationEngine::new(&config).recommend(&p);
        assert!(titles(&recs).contains(&"High Cardinality in 'user_id'"));
        assert!(!titles(&recs).contains(&"High Cardinality in 'row'"));
    }

    #[test]
    fn test_feature_scaling() {
        let config = ProfilingConfig::default();
        let mut small = column("rate", SemanticType::Float, 0.0, 10);
        small.numeric_range = Some(NumericRange { min: 0.0, max: 1.0 });
        let mut big = column("income", SemanticType::Integer, 0.0, 10);
        big.numeric_range = Some(NumericRange {
            min: 1000.0,
            max: 250_000.0,
        });
        let mut flat = column("const", SemanticType::Integer, 0.0, 10);
        flat.numeric_range = Some(NumericRange { min: 5.0, max: 5.0 });

        let p = profile(10, 0, vec![small, big, flat]);
        let recs = RecommendationEngine::new(&config).recommend(&p);
        let scaling = recs
            .iter()
            .find(|r| r.category == RecommendationCategory::Preprocessing)
            .unwrap();
        assert!(scaling.description.contains("'income'"));
        assert!(scaling.description.contains("'rate'"));
    }

    #[test]
    fn test_text_type_rules() {
        let config = ProfilingConfig::default();
        let mut prices = column("price", SemanticType::Categorical, 0.0, 10);
        prices.formatted_numeric = true;
        let mut dates = column("when", SemanticType::Categorical, 0.0, 10);
        dates.date_like_sample = true;

        let p = profile(10, 0, vec![prices, dates]);
        let recs = RecommendationEngine::new(&config).recommend(&p);
        let data_type: Vec<_> = recs
            .iter()
            .filter(|r| r.category == RecommendationCategory::DataType)
            .map(|r| (r.kind, r.title.as_str()))
            .collect();

        assert_eq!(
            data_type,
            vec![
                (RecommendationType::Warning, "Numeric Values Stored as Text in 'price'"),
                (RecommendationType::Info, "Potential Date Column 'when'"),
            ]
        );
    }

    #[test]
    fn test_large_memory_threshold_is_configurable() {
        let config = ProfilingConfig::builder().large_memory_mb(0.1).build().unwrap();
        let p = profile(10, 0, vec![column("a", SemanticType::Integer, 0.0, 10)]);
        let recs = RecommendationEngine::new(&config).recommend(&p);
        let memory = recs
            .iter()
            .find(|r| r.title == "Large Memory Usage")
            .unwrap();
        assert_eq!(memory.description, "The dataset uses an estimated 0.50 MB of memory.");
    }

    #[test]
    fn test_zero_rows_yields_nothing() {
        let config = ProfilingConfig::default();
        let p = profile(0, 0, vec![]);
        assert!(RecommendationEngine::new(&config).recommend(&p).is_empty());
    }

    #[test]
    fn test_custom_rule_table() {
        let config = ProfilingConfig::default();
        let rules = &RULES[11..];
        let p = profile(10, 0, vec![column("a", SemanticType::Integer, 0.0, 10)]);
        let recs = RecommendationEngine::with_rules(&config, rules).recommend(&p);
        assert_eq!(titles(&recs), vec!["Good Data Quality"]);
    }
}
