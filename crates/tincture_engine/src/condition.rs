//! Conditional override evaluation
//!
//! Themes carry ordered sets of conditional overrides (dark mode after
//! 18:00, a feature-flagged accent color, a locale-specific font stack).
//! The boolean expressions themselves are evaluated by an external
//! [`ConditionEvaluator`]; this module only decides which override sets
//! apply for a given context and in what order.

use indexmap::IndexMap;
use thiserror::Error;

use tincture_core::{Condition, EvalContext, Result, ThemeError, TokenValue};

/// Errors an external condition evaluator may report.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// The evaluator did not answer in time.
    #[error("condition evaluation timed out")]
    Timeout,
    /// The expression could not be evaluated (parse error, missing data).
    #[error("condition evaluation failed: {0}")]
    Failed(String),
}

/// External boolean-expression evaluator. Opaque to the engine: any
/// expression language works as long as evaluation is deterministic for a
/// fixed `(expression, context)` pair.
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluate `expression` against `context`.
    fn evaluate(&self, expression: &str, context: &EvalContext)
        -> std::result::Result<bool, EvalError>;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&str, &EvalContext) -> std::result::Result<bool, EvalError> + Send + Sync,
{
    fn evaluate(
        &self,
        expression: &str,
        context: &EvalContext,
    ) -> std::result::Result<bool, EvalError> {
        self(expression, context)
    }
}

/// The matched override sets for one resolution pass, highest priority
/// first.
///
/// Built once per pass: every condition is evaluated exactly once, which
/// satisfies the per-`(context, condition)` memoization requirement since
/// the same condition typically gates many token paths.
#[derive(Debug, Default)]
pub struct OverridePlan {
    /// Matched conditions' overrides, descending priority, declaration
    /// order within equal priorities.
    matched: Vec<MatchedCondition>,
}

#[derive(Debug)]
struct MatchedCondition {
    id: String,
    overrides: IndexMap<String, TokenValue>,
}

impl OverridePlan {
    /// Evaluate `conditions` against `context` and collect the overrides of
    /// every matching one.
    ///
    /// Ordering: descending priority, stable for ties (declaration order).
    /// At most `max_conditions` conditions are evaluated; the rest are
    /// skipped with a warning — a hard cap so a misconfigured theme cannot
    /// cause unbounded work.
    ///
    /// Failure policy: an evaluator timeout aborts the pass with
    /// [`ThemeError::DataSourceTimeout`]; any other evaluator error fails
    /// closed (the condition does not match) and is logged, never aborting
    /// resolution.
    pub fn build(
        conditions: &[Condition],
        context: &EvalContext,
        evaluator: &dyn ConditionEvaluator,
        max_conditions: usize,
    ) -> Result<OverridePlan> {
        let mut ordered: Vec<&Condition> = conditions.iter().collect();
        // Stable sort: ties keep declaration order.
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

        if ordered.len() > max_conditions {
            tracing::warn!(
                total = ordered.len(),
                max = max_conditions,
                "condition count exceeds cap; lowest-priority conditions skipped"
            );
            ordered.truncate(max_conditions);
        }

        let mut matched = Vec::new();
        for condition in ordered {
            match evaluator.evaluate(&condition.expression, context) {
                Ok(true) => matched.push(MatchedCondition {
                    id: condition.id.clone(),
                    overrides: condition.overrides.clone(),
                }),
                Ok(false) => {}
                Err(EvalError::Timeout) => {
                    return Err(ThemeError::DataSourceTimeout {
                        source_name: "condition evaluator".into(),
                    });
                }
                Err(EvalError::Failed(reason)) => {
                    // Fails closed: treated as non-matching.
                    tracing::warn!(
                        condition = %condition.id,
                        %reason,
                        "condition evaluation failed; treating as non-matching"
                    );
                }
            }
        }

        Ok(OverridePlan { matched })
    }

    /// The override for an exact token path, if any matched condition
    /// provides one. The highest-priority match wins; non-conflicting
    /// overrides from lower-priority matches still apply to their own paths.
    pub fn override_for(&self, path: &str) -> Option<&TokenValue> {
        self.matched
            .iter()
            .find_map(|condition| condition.overrides.get(path))
    }

    /// Paths introduced only by overrides (not necessarily present in the
    /// base store), deduplicated, in plan order.
    pub fn override_paths(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for condition in &self.matched {
            for path in condition.overrides.keys() {
                if !seen.contains(&path.as_str()) {
                    seen.push(path.as_str());
                }
            }
        }
        seen
    }

    /// Ids of the conditions that matched, in application order.
    pub fn matched_ids(&self) -> Vec<&str> {
        self.matched.iter().map(|c| c.id.as_str()).collect()
    }

    /// Whether no condition matched.
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}
