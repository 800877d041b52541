// ABOUTME: Content catalog and audience membership for Lumora
// ABOUTME: Articles, targeting rules, questionnaires, and the resync machinery that ties them together

pub mod articles;
pub mod audience;
pub mod categories;
pub mod db;
pub mod membership;
pub mod questionnaires;
pub mod rules;
pub mod users;
pub mod validation;

pub use articles::{Article, ArticleCreateInput, ArticleStorage, ArticleUpdateInput};
pub use audience::{resolve_audience, AudienceError, MembershipSynchronizer, SyncOutcome};
pub use categories::{Category, CategoryKind, CategoryStorage, Period, SubCategory};
pub use db::DbState;
pub use membership::{Membership, MembershipStorage, VisibleArticle};
pub use questionnaires::{
    AgeBracket, Feeling, Gender, Questionnaire, QuestionnaireInput, QuestionnaireStorage, SkinGoal,
};
pub use rules::{Rule, RuleInput, RuleOperator, RuleStorage, RuleValue, RuleVariable};
pub use users::{User, UserCreateInput, UserStorage};
pub use validation::ValidationError;
