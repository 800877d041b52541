// ABOUTME: Integration tests for targeting rule validation
// ABOUTME: Placement, operator, and ordinal-bound invariants enforced by RuleStorage

mod common;

use common::*;
use lumora_content::rules::RuleInput;
use lumora_content::{AgeBracket, CategoryKind, RuleOperator, RuleStorage, RuleValue};
use lumora_storage::StorageError;

fn age_rule(operator: RuleOperator, bracket: AgeBracket) -> RuleInput {
    RuleInput {
        operator,
        value: RuleValue::Age(bracket),
    }
}

#[tokio::test]
async fn test_rules_rejected_outside_core_program() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::Wellness).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    let err = rules
        .create_rule(
            &article,
            RuleInput {
                operator: RuleOperator::Eq,
                value: RuleValue::Pill(true),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_ordinal_operator_requires_age_variable() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    let err = rules
        .create_rule(
            &article,
            RuleInput {
                operator: RuleOperator::Gte,
                value: RuleValue::Menstruating(true),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_second_ordinal_bound_on_same_article_rejected() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    rules
        .create_rule(&article, age_rule(RuleOperator::Gt, AgeBracket::Age17To21))
        .await
        .unwrap();

    let err = rules
        .create_rule(&article, age_rule(RuleOperator::Lt, AgeBracket::Age46To60))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_updating_a_rule_replaces_its_own_bound() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    let (rule, _event) = rules
        .create_rule(&article, age_rule(RuleOperator::Gt, AgeBracket::Age17To21))
        .await
        .unwrap();

    let (updated, _event) = rules
        .update_rule(&rule.id, age_rule(RuleOperator::Lte, AgeBracket::Age36To45))
        .await
        .unwrap();

    assert_eq!(updated.id, rule.id);
    assert_eq!(updated.operator, RuleOperator::Lte);
    assert_eq!(updated.value, RuleValue::Age(AgeBracket::Age36To45));
}

#[tokio::test]
async fn test_equality_rules_may_stack_on_one_variable() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    rules
        .create_rule(&article, age_rule(RuleOperator::Eq, AgeBracket::Age22To26))
        .await
        .unwrap();
    rules
        .create_rule(&article, age_rule(RuleOperator::Eq, AgeBracket::Age27To35))
        .await
        .unwrap();

    assert_eq!(rules.count_for_article(&article).await.unwrap(), 2);
}

#[tokio::test]
async fn test_rule_events_carry_publish_state() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let published = create_article(&pool, &category, true).await;
    let draft = create_article(&pool, &category, false).await;

    let rules = RuleStorage::new(pool.clone());

    let (_rule, event) = rules
        .create_rule(
            &published,
            RuleInput {
                operator: RuleOperator::Eq,
                value: RuleValue::Pill(true),
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        event,
        lumora_core::ChangeEvent::RuleSaved {
            article_published: true,
            ..
        }
    ));

    let (_rule, event) = rules
        .create_rule(
            &draft,
            RuleInput {
                operator: RuleOperator::Eq,
                value: RuleValue::Pill(true),
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        event,
        lumora_core::ChangeEvent::RuleSaved {
            article_published: false,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rules_cascade_with_article_deletion() {
    let pool = setup_test_db().await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    let (rule, _event) = rules
        .create_rule(
            &article,
            RuleInput {
                operator: RuleOperator::Eq,
                value: RuleValue::Pill(true),
            },
        )
        .await
        .unwrap();

    let articles = lumora_content::ArticleStorage::new(pool.clone());
    articles.delete_article(&article).await.unwrap();

    let err = rules.get_rule(&rule.id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}
