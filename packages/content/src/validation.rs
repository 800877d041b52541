// ABOUTME: Domain validation errors shared across content storage layers
// ABOUTME: Rejections happen before any row is written

use thiserror::Error;

use crate::categories::CategoryKind;
use crate::rules::{RuleOperator, RuleVariable};
use lumora_storage::StorageError;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("operator {0} is ordinal and only applies to the age variable")]
    OrdinalOperatorNotAllowed(RuleOperator),

    #[error("article already has an ordinal bound on {0}")]
    DuplicateOrdinalBound(RuleVariable),

    #[error("targeting rules are only allowed on core-program articles, not {0}")]
    RulesRequireCoreProgram(CategoryKind),

    #[error("subcategory {subcategory_id} does not belong to category {category_id}")]
    SubcategoryOutsideCategory {
        subcategory_id: String,
        category_id: String,
    },

    #[error("title must not be empty")]
    EmptyTitle,
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err.to_string())
    }
}
