// ABOUTME: Common test utilities for content integration tests
// ABOUTME: In-memory database setup and seed helpers

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use lumora_content::categories::CategoryCreateInput;
use lumora_content::{
    AgeBracket, ArticleCreateInput, ArticleStorage, CategoryKind, CategoryStorage, Feeling, Gender,
    QuestionnaireInput, QuestionnaireStorage, SkinGoal, UserCreateInput, UserStorage,
};

/// In-memory database with migrations applied. A single connection keeps
/// every query on the same memory database.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database pool");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();

    lumora_content::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

#[allow(dead_code)]
pub async fn create_user(pool: &SqlitePool, email: &str) -> String {
    let storage = UserStorage::new(pool.clone());
    storage
        .create_user(UserCreateInput {
            email: email.to_string(),
            display_name: "Test User".to_string(),
        })
        .await
        .expect("Failed to create user")
        .id
}

#[allow(dead_code)]
pub async fn create_category(pool: &SqlitePool, kind: CategoryKind) -> String {
    let storage = CategoryStorage::new(pool.clone());
    storage
        .create_category(CategoryCreateInput {
            name: format!("{} category", kind),
            kind,
            position: None,
        })
        .await
        .expect("Failed to create category")
        .id
}

#[allow(dead_code)]
pub async fn create_article(pool: &SqlitePool, category_id: &str, published: bool) -> String {
    let storage = ArticleStorage::new(pool.clone());
    let (article, _event) = storage
        .create_article(ArticleCreateInput {
            title: "Test article".to_string(),
            summary: None,
            body: "Body".to_string(),
            category_id: category_id.to_string(),
            subcategory_id: None,
            period_id: None,
            is_published: Some(published),
        })
        .await
        .expect("Failed to create article");
    article.id
}

#[allow(dead_code)]
pub fn questionnaire_input() -> QuestionnaireInput {
    QuestionnaireInput {
        age_bracket: AgeBracket::Age22To26,
        gender: Gender::Female,
        skin_goal: SkinGoal::ClearBreakouts,
        feeling: Feeling::Balanced,
        taking_pill: false,
        menstruating: false,
        sleep_hours: None,
        stress_level: None,
    }
}

#[allow(dead_code)]
pub async fn submit_questionnaire(pool: &SqlitePool, user_id: &str, input: QuestionnaireInput) {
    let storage = QuestionnaireStorage::new(pool.clone());
    storage
        .upsert_for_user(user_id, input)
        .await
        .expect("Failed to save questionnaire");
}
