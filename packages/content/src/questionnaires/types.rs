// ABOUTME: Questionnaire type definitions
// ABOUTME: Profile answer enums plus the stored questionnaire record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Age brackets in ascending order. The derived `Ord` follows declaration
/// order, which is what ordinal rule comparison relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "TEXT")]
pub enum AgeBracket {
    #[serde(rename = "12-16")]
    #[sqlx(rename = "12-16")]
    Age12To16,
    #[serde(rename = "17-21")]
    #[sqlx(rename = "17-21")]
    Age17To21,
    #[serde(rename = "22-26")]
    #[sqlx(rename = "22-26")]
    Age22To26,
    #[serde(rename = "27-35")]
    #[sqlx(rename = "27-35")]
    Age27To35,
    #[serde(rename = "36-45")]
    #[sqlx(rename = "36-45")]
    Age36To45,
    #[serde(rename = "46-60")]
    #[sqlx(rename = "46-60")]
    Age46To60,
    #[serde(rename = "61+")]
    #[sqlx(rename = "61+")]
    Age61Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SkinGoal {
    ClearBreakouts,
    EvenTone,
    DeepHydration,
    FirmAndLift,
    SootheSensitivity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Feeling {
    Energized,
    Balanced,
    Tired,
    Stressed,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: String,
    pub user_id: String,
    pub age_bracket: AgeBracket,
    pub gender: Gender,
    pub skin_goal: SkinGoal,
    pub feeling: Feeling,
    pub taking_pill: bool,
    pub menstruating: bool,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireInput {
    pub age_bracket: AgeBracket,
    pub gender: Gender,
    pub skin_goal: SkinGoal,
    pub feeling: Feeling,
    pub taking_pill: bool,
    pub menstruating: bool,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<i64>,
}
