// ABOUTME: Pure audience resolution over targeting rules
// ABOUTME: Same-variable rules OR together, different variables AND together

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::questionnaires::Questionnaire;
use crate::rules::{Rule, RuleOperator, RuleValue, RuleVariable};
use lumora_storage::StorageError;

#[derive(Debug, Error)]
pub enum AudienceError {
    /// An ordinal operator paired with a non-ordinal variable. Storage
    /// validation prevents this; a row that predates it still fails loudly
    /// here instead of silently matching nobody.
    #[error("rule {rule_id} applies ordinal operator {operator} to a non-ordinal variable")]
    UnsupportedComparison {
        rule_id: String,
        operator: RuleOperator,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Compute which questionnaire holders an article's rules select.
///
/// Evaluation is conjunctive-normal-form over variables: a user matches when
/// every variable group contains at least one rule satisfied by their
/// answers. Users without a questionnaire are not in the input and therefore
/// never match; the no-rules everyone case is the synchronizer's branch, not
/// this function's.
pub fn resolve_audience(
    rules: &[Rule],
    questionnaires: &[Questionnaire],
) -> Result<HashSet<String>, AudienceError> {
    validate_rules(rules)?;

    let mut groups: HashMap<RuleVariable, Vec<&Rule>> = HashMap::new();
    for rule in rules {
        groups.entry(rule.value.variable()).or_default().push(rule);
    }

    let mut audience = HashSet::new();
    for questionnaire in questionnaires {
        let matches_all_groups = groups
            .values()
            .all(|group| group.iter().any(|rule| rule_matches(rule, questionnaire)));

        if matches_all_groups {
            audience.insert(questionnaire.user_id.clone());
        }
    }

    Ok(audience)
}

/// Reject malformed rule rows up front so evaluation itself is total and
/// deterministic.
fn validate_rules(rules: &[Rule]) -> Result<(), AudienceError> {
    for rule in rules {
        if rule.operator.is_ordinal() && rule.value.variable() != RuleVariable::Age {
            return Err(AudienceError::UnsupportedComparison {
                rule_id: rule.id.clone(),
                operator: rule.operator,
            });
        }
    }
    Ok(())
}

fn rule_matches(rule: &Rule, questionnaire: &Questionnaire) -> bool {
    use RuleOperator::*;

    match (&rule.value, rule.operator) {
        (RuleValue::SkinGoal(v), Eq) => questionnaire.skin_goal == *v,
        (RuleValue::SkinGoal(v), Neq) => questionnaire.skin_goal != *v,
        (RuleValue::Feeling(v), Eq) => questionnaire.feeling == *v,
        (RuleValue::Feeling(v), Neq) => questionnaire.feeling != *v,
        (RuleValue::Gender(v), Eq) => questionnaire.gender == *v,
        (RuleValue::Gender(v), Neq) => questionnaire.gender != *v,
        (RuleValue::Pill(v), Eq) => questionnaire.taking_pill == *v,
        (RuleValue::Pill(v), Neq) => questionnaire.taking_pill != *v,
        (RuleValue::Menstruating(v), Eq) => questionnaire.menstruating == *v,
        (RuleValue::Menstruating(v), Neq) => questionnaire.menstruating != *v,
        (RuleValue::Age(v), Eq) => questionnaire.age_bracket == *v,
        (RuleValue::Age(v), Neq) => questionnaire.age_bracket != *v,
        (RuleValue::Age(v), Gt) => questionnaire.age_bracket > *v,
        (RuleValue::Age(v), Gte) => questionnaire.age_bracket >= *v,
        (RuleValue::Age(v), Lt) => questionnaire.age_bracket < *v,
        (RuleValue::Age(v), Lte) => questionnaire.age_bracket <= *v,
        // Ordinal operator on a non-age variable; validate_rules already
        // rejected these.
        _ => false,
    }
}
