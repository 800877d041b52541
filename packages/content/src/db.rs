// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool and content storage layers

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::articles::ArticleStorage;
use crate::audience::MembershipSynchronizer;
use crate::categories::CategoryStorage;
use crate::membership::MembershipStorage;
use crate::questionnaires::QuestionnaireStorage;
use crate::rules::RuleStorage;
use crate::users::UserStorage;
use lumora_storage::StorageError;

/// Shared database state for content operations
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub user_storage: Arc<UserStorage>,
    pub category_storage: Arc<CategoryStorage>,
    pub article_storage: Arc<ArticleStorage>,
    pub rule_storage: Arc<RuleStorage>,
    pub questionnaire_storage: Arc<QuestionnaireStorage>,
    pub membership_storage: Arc<MembershipStorage>,
    pub synchronizer: Arc<MembershipSynchronizer>,
}

impl DbState {
    /// Create new database state from a SQLite pool
    pub fn new(pool: SqlitePool) -> Self {
        let user_storage = Arc::new(UserStorage::new(pool.clone()));
        let category_storage = Arc::new(CategoryStorage::new(pool.clone()));
        let article_storage = Arc::new(ArticleStorage::new(pool.clone()));
        let rule_storage = Arc::new(RuleStorage::new(pool.clone()));
        let questionnaire_storage = Arc::new(QuestionnaireStorage::new(pool.clone()));
        let membership_storage = Arc::new(MembershipStorage::new(pool.clone()));
        let synchronizer = Arc::new(MembershipSynchronizer::new(pool.clone()));

        Self {
            pool,
            user_storage,
            category_storage,
            article_storage,
            rule_storage,
            questionnaire_storage,
            membership_storage,
            synchronizer,
        }
    }

    /// Initialize database state with default configuration
    pub async fn init() -> Result<Self, StorageError> {
        Self::init_with_path(None).await
    }

    /// Initialize database state with optional custom database path
    pub async fn init_with_path(
        database_path: Option<std::path::PathBuf>,
    ) -> Result<Self, StorageError> {
        let database_path = database_path.unwrap_or_else(lumora_core::database_file);

        // Ensure parent directory exists
        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let pool = lumora_storage::connect(&database_path).await?;

        info!("Database connection established");

        run_migrations(&pool).await?;

        debug!("Database migrations completed");

        Ok(Self::new(pool))
    }
}

/// Run the embedded migrations against `pool`. Exposed so sibling packages
/// can migrate their in-memory test databases.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("../storage/migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)?;

    Ok(())
}
