// ABOUTME: Targeting rule type definitions
// ABOUTME: Operator, variable, and the tagged value union a rule compares against

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::questionnaires::{AgeBracket, Feeling, Gender, SkinGoal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RuleOperator {
    /// Ordinal operators compare against an ordering and are only valid for
    /// the age variable.
    pub fn is_ordinal(&self) -> bool {
        matches!(
            self,
            RuleOperator::Gt | RuleOperator::Gte | RuleOperator::Lt | RuleOperator::Lte
        )
    }
}

impl std::fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuleOperator::Eq => "eq",
            RuleOperator::Neq => "neq",
            RuleOperator::Gt => "gt",
            RuleOperator::Gte => "gte",
            RuleOperator::Lt => "lt",
            RuleOperator::Lte => "lte",
        };
        write!(f, "{}", s)
    }
}

/// Which questionnaire answer a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVariable {
    SkinGoal,
    Feeling,
    Age,
    Gender,
    Pill,
    Menstruating,
}

impl std::fmt::Display for RuleVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuleVariable::SkinGoal => "skin_goal",
            RuleVariable::Feeling => "feeling",
            RuleVariable::Age => "age",
            RuleVariable::Gender => "gender",
            RuleVariable::Pill => "pill",
            RuleVariable::Menstruating => "menstruating",
        };
        write!(f, "{}", s)
    }
}

/// A rule's comparison value, tagged with the variable it applies to.
///
/// Stored as JSON in the `value` column, e.g.
/// `{"variable":"age","value":"22-26"}`. The tag makes a rule row
/// self-describing; no separate variable column to drift out of sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variable", content = "value", rename_all = "snake_case")]
pub enum RuleValue {
    SkinGoal(SkinGoal),
    Feeling(Feeling),
    Age(AgeBracket),
    Gender(Gender),
    Pill(bool),
    Menstruating(bool),
}

impl RuleValue {
    pub fn variable(&self) -> RuleVariable {
        match self {
            RuleValue::SkinGoal(_) => RuleVariable::SkinGoal,
            RuleValue::Feeling(_) => RuleVariable::Feeling,
            RuleValue::Age(_) => RuleVariable::Age,
            RuleValue::Gender(_) => RuleVariable::Gender,
            RuleValue::Pill(_) => RuleVariable::Pill,
            RuleValue::Menstruating(_) => RuleVariable::Menstruating,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub article_id: String,
    pub operator: RuleOperator,
    pub value: RuleValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInput {
    pub operator: RuleOperator,
    pub value: RuleValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_operators() {
        assert!(!RuleOperator::Eq.is_ordinal());
        assert!(!RuleOperator::Neq.is_ordinal());
        assert!(RuleOperator::Gt.is_ordinal());
        assert!(RuleOperator::Gte.is_ordinal());
        assert!(RuleOperator::Lt.is_ordinal());
        assert!(RuleOperator::Lte.is_ordinal());
    }

    #[test]
    fn test_rule_value_tagged_json() {
        let value = RuleValue::Age(AgeBracket::Age22To26);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"variable":"age","value":"22-26"}"#);

        let parsed: RuleValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_rule_value_variable() {
        assert_eq!(RuleValue::Pill(true).variable(), RuleVariable::Pill);
        assert_eq!(
            RuleValue::Gender(Gender::Female).variable(),
            RuleVariable::Gender
        );
        assert_eq!(
            RuleValue::Age(AgeBracket::Age12To16).variable(),
            RuleVariable::Age
        );
    }
}
