// ABOUTME: Taxonomy type definitions
// ABOUTME: Category kinds drive which articles get audience management and targeting rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Behavioral class of a category.
///
/// Membership rows are maintained only for `CoreProgram` and `Initial`
/// sections; `Discover` and `Wellness` are visible to everyone without
/// per-user rows. Targeting rules attach to `CoreProgram` articles only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    CoreProgram,
    Initial,
    Discover,
    Wellness,
}

impl CategoryKind {
    /// Whether articles under this kind carry per-user membership rows.
    pub fn is_membership_managed(&self) -> bool {
        matches!(self, CategoryKind::CoreProgram | CategoryKind::Initial)
    }

    /// Whether articles under this kind may carry targeting rules.
    pub fn allows_rules(&self) -> bool {
        matches!(self, CategoryKind::CoreProgram)
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CategoryKind::CoreProgram => "core_program",
            CategoryKind::Initial => "initial",
            CategoryKind::Discover => "discover",
            CategoryKind::Wellness => "wellness",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A phase of the core program (e.g. week ranges). Articles may be pinned
/// to a period for client-side sequencing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreateInput {
    pub name: String,
    pub kind: CategoryKind,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryCreateInput {
    pub category_id: String,
    pub name: String,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCreateInput {
    pub name: String,
    pub position: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_membership_management() {
        assert!(CategoryKind::CoreProgram.is_membership_managed());
        assert!(CategoryKind::Initial.is_membership_managed());
        assert!(!CategoryKind::Discover.is_membership_managed());
        assert!(!CategoryKind::Wellness.is_membership_managed());
    }

    #[test]
    fn test_only_core_program_allows_rules() {
        assert!(CategoryKind::CoreProgram.allows_rules());
        assert!(!CategoryKind::Initial.allows_rules());
        assert!(!CategoryKind::Discover.allows_rules());
        assert!(!CategoryKind::Wellness.allows_rules());
    }
}
