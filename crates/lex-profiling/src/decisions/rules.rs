//! The static recommendation rule table.
//!
//! Each [`Rule`] pairs a trigger with a severity, a category and three text
//! templates. Triggers return the placeholder values to substitute, or
//! `None` when the rule does not fire. Order in [`RULES`] is evaluation
//! order.

use crate::config::ProfilingConfig;
use crate::types::{ColumnProfile, Insights, RecommendationCategory, RecommendationType, SemanticType};

/// Everything a trigger may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub insights: &'a Insights,
    pub columns: &'a [ColumnProfile],
    pub config: &'a ProfilingConfig,
}

/// Placeholder name/value pairs for template rendering.
pub type TemplateVars = Vec<(&'static str, String)>;

type ColumnTrigger = fn(&ColumnProfile, &RuleContext<'_>) -> Option<TemplateVars>;
type DatasetTrigger = fn(&RuleContext<'_>) -> Option<TemplateVars>;

/// When a rule is evaluated.
#[derive(Clone, Copy)]
pub enum Trigger {
    /// Evaluated for every column in source order; `{column}` is always set.
    Column(ColumnTrigger),
    /// Evaluated once for the whole dataset.
    Dataset(DatasetTrigger),
}

/// One row of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub kind: RecommendationType,
    pub category: RecommendationCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("category", &self.category)
            .finish()
    }
}

/// Substitute `{name}` placeholders in `template`.
///
/// The template is scanned once, so substituted values are never
/// themselves searched for placeholders. Unknown placeholders are kept.
pub fn render(template: &str, vars: &[(&'static str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn fmt_pct(value: f64) -> String {
    format!("{:.1}", value)
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "high_missing",
        trigger: Trigger::Column(high_missing),
        kind: RecommendationType::Critical,
        category: RecommendationCategory::MissingData,
        title: "High Missing Data in '{column}'",
        description: "Column '{column}' is missing {percentage}% of its values ({count} rows). \
                      Consider dropping it or investigating how the data was collected.",
        action: "Review the data collection process or remove the column",
    },
    Rule {
        name: "moderate_missing",
        trigger: Trigger::Column(moderate_missing),
        kind: RecommendationType::Warning,
        category: RecommendationCategory::MissingData,
        title: "Moderate Missing Data in '{column}'",
        description: "Column '{column}' is missing {percentage}% of its values ({count} rows). \
                      Consider an imputation strategy such as mean, median or mode.",
        action: "Apply an appropriate imputation technique",
    },
    Rule {
        name: "low_missing",
        trigger: Trigger::Column(low_missing),
        kind: RecommendationType::Info,
        category: RecommendationCategory::MissingData,
        title: "Low Missing Data in '{column}'",
        description: "Column '{column}' is missing {percentage}% of its values ({count} rows). \
                      Simple imputation or dropping the affected rows may be enough.",
        action: "Use simple imputation or drop the affected rows",
    },
    Rule {
        name: "duplicate_rows",
        trigger: Trigger::Dataset(duplicate_rows),
        kind: RecommendationType::Warning,
        category: RecommendationCategory::DataQuality,
        title: "Duplicate Rows Detected",
        description: "Found {count} duplicate rows ({percentage}% of the dataset).",
        action: "Investigate and remove duplicates if they are not intentional",
    },
    Rule {
        name: "constant_column",
        trigger: Trigger::Column(constant_column),
        kind: RecommendationType::Warning,
        category: RecommendationCategory::FeatureEngineering,
        title: "Constant Column '{column}'",
        description: "Column '{column}' has {distinct} distinct values and carries no \
                      information for analysis.",
        action: "Drop the column",
    },
    Rule {
        name: "high_cardinality",
        trigger: Trigger::Column(high_cardinality),
        kind: RecommendationType::Info,
        category: RecommendationCategory::FeatureEngineering,
        title: "High Cardinality in '{column}'",
        description: "Column '{column}' has {distinct} distinct values ({ratio}% of rows). \
                      It may be an identifier or need special handling.",
        action: "Consider feature hashing, target encoding, or removing it if it is an identifier",
    },
    Rule {
        name: "categorical_encoding",
        trigger: Trigger::Column(categorical_encoding),
        kind: RecommendationType::Info,
        category: RecommendationCategory::Optimization,
        title: "Categorical Encoding Opportunity for '{column}'",
        description: "Column '{column}' has only {distinct} distinct values across {rows} rows. \
                      Storing it as a categorical type saves memory.",
        action: "Convert to a categorical type or apply label/one-hot encoding",
    },
    Rule {
        name: "formatted_numeric",
        trigger: Trigger::Column(formatted_numeric),
        kind: RecommendationType::Warning,
        category: RecommendationCategory::DataType,
        title: "Numeric Values Stored as Text in '{column}'",
        description: "Column '{column}' holds numbers wrapped in formatting such as currency \
                      symbols, percent signs or thousands separators.",
        action: "Strip the formatting and convert the column to a numeric type",
    },
    Rule {
        name: "potential_dates",
        trigger: Trigger::Column(potential_dates),
        kind: RecommendationType::Info,
        category: RecommendationCategory::DataType,
        title: "Potential Date Column '{column}'",
        description: "Column '{column}' appears to contain dates but is stored as text.",
        action: "Convert the column to a datetime type",
    },
    Rule {
        name: "large_memory",
        trigger: Trigger::Dataset(large_memory),
        kind: RecommendationType::Info,
        category: RecommendationCategory::Optimization,
        title: "Large Memory Usage",
        description: "The dataset uses an estimated {memory} MB of memory.",
        action: "Use narrower types (int8, int16, category) and consider processing in chunks",
    },
    Rule {
        name: "feature_scaling",
        trigger: Trigger::Dataset(feature_scaling),
        kind: RecommendationType::Info,
        category: RecommendationCategory::Preprocessing,
        title: "Feature Scaling Recommended",
        description: "Numeric columns have very different scales: '{widest}' spans {ratio}x the \
                      range of '{narrowest}'. This can affect some machine learning algorithms.",
        action: "Apply standardization or min-max scaling before modeling",
    },
    Rule {
        name: "good_quality",
        trigger: Trigger::Dataset(good_quality),
        kind: RecommendationType::Success,
        category: RecommendationCategory::OverallQuality,
        title: "Good Data Quality",
        description: "The dataset is {completeness}% complete with no duplicate rows. \
                      It is relatively clean and ready for analysis.",
        action: "Proceed with exploratory data analysis and modeling",
    },
];

// =============================================================================
// Triggers
// =============================================================================

fn missing_vars(column: &ColumnProfile) -> TemplateVars {
    vec![
        ("percentage", fmt_pct(column.missing_percentage)),
        ("count", column.missing_count.to_string()),
    ]
}

fn high_missing(column: &ColumnProfile, ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    (column.missing_percentage > ctx.config.critical_missing_threshold)
        .then(|| missing_vars(column))
}

fn moderate_missing(column: &ColumnProfile, ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let pct = column.missing_percentage;
    (pct > ctx.config.warning_missing_threshold && pct <= ctx.config.critical_missing_threshold)
        .then(|| missing_vars(column))
}

fn low_missing(column: &ColumnProfile, ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let pct = column.missing_percentage;
    (pct > 0.0 && pct <= ctx.config.warning_missing_threshold).then(|| missing_vars(column))
}

fn duplicate_rows(ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let insights = ctx.insights;
    (insights.duplicates > 0).then(|| {
        let pct = 100.0 * insights.duplicates as f64 / insights.row_count as f64;
        vec![
            ("count", insights.duplicates.to_string()),
            ("percentage", fmt_pct(pct)),
        ]
    })
}

fn constant_column(column: &ColumnProfile, _ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    (column.distinct_count <= 1).then(|| vec![("distinct", column.distinct_count.to_string())])
}

fn cardinality_ratio(column: &ColumnProfile, ctx: &RuleContext<'_>) -> f64 {
    column.distinct_count as f64 / ctx.insights.row_count as f64
}

fn high_cardinality(column: &ColumnProfile, ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let ratio = cardinality_ratio(column, ctx);
    (column.semantic_type == SemanticType::Categorical && ratio > ctx.config.high_cardinality_ratio)
        .then(|| {
            vec![
                ("distinct", column.distinct_count.to_string()),
                ("ratio", fmt_pct(ratio * 100.0)),
            ]
        })
}

fn categorical_encoding(column: &ColumnProfile, ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let ratio = cardinality_ratio(column, ctx);
    (column.semantic_type == SemanticType::Categorical
        && column.distinct_count >= 2
        && ratio < ctx.config.low_cardinality_ratio)
        .then(|| {
            vec![
                ("distinct", column.distinct_count.to_string()),
                ("rows", ctx.insights.row_count.to_string()),
            ]
        })
}

fn formatted_numeric(column: &ColumnProfile, _ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    (column.semantic_type == SemanticType::Categorical && column.formatted_numeric)
        .then(TemplateVars::new)
}

fn potential_dates(column: &ColumnProfile, _ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    (column.semantic_type == SemanticType::Categorical && column.date_like_sample)
        .then(TemplateVars::new)
}

fn large_memory(ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    (ctx.insights.memory_usage > ctx.config.large_memory_mb)
        .then(|| vec![("memory", format!("{:.2}", ctx.insights.memory_usage))])
}

fn feature_scaling(ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let spans: Vec<(&str, f64)> = ctx
        .columns
        .iter()
        .filter(|c| c.semantic_type.is_numeric())
        .filter_map(|c| c.numeric_range.map(|r| (c.name.as_str(), r.span())))
        .filter(|(_, span)| *span > 0.0)
        .collect();

    if spans.len() < 2 {
        return None;
    }

    // First column wins ties so the output is stable.
    let mut widest = spans[0];
    let mut narrowest = spans[0];
    for &entry in &spans[1..] {
        if entry.1 > widest.1 {
            widest = entry;
        }
        if entry.1 < narrowest.1 {
            narrowest = entry;
        }
    }

    let ratio = widest.1 / narrowest.1;
    (ratio > ctx.config.scaling_ratio).then(|| {
        vec![
            ("widest", widest.0.to_string()),
            ("narrowest", narrowest.0.to_string()),
            ("ratio", format!("{:.0}", ratio)),
        ]
    })
}

fn good_quality(ctx: &RuleContext<'_>) -> Option<TemplateVars> {
    let insights = ctx.insights;
    (insights.completeness >= ctx.config.completeness_threshold && insights.duplicates == 0)
        .then(|| vec![("completeness", fmt_pct(insights.completeness))])
}
