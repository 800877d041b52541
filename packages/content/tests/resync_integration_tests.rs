// ABOUTME: Integration tests for membership resynchronization
// ABOUTME: Covers seeding, audience narrowing, read-state preservation, and skip paths

mod common;

use common::*;
use lumora_content::rules::RuleInput;
use lumora_content::{
    CategoryKind, MembershipStorage, MembershipSynchronizer, QuestionnaireInput, RuleOperator,
    RuleStorage, RuleValue,
};

#[tokio::test]
async fn test_article_without_rules_targets_every_user() {
    let pool = setup_test_db().await;

    let with_answers = create_user(&pool, "a@example.com").await;
    let other_answers = create_user(&pool, "b@example.com").await;
    let no_answers = create_user(&pool, "c@example.com").await;
    submit_questionnaire(&pool, &with_answers, questionnaire_input()).await;
    submit_questionnaire(&pool, &other_answers, questionnaire_input()).await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    let outcome = synchronizer.resync_article(&article).await.unwrap();

    assert!(outcome.synced);
    assert_eq!(outcome.target_size, 3);
    assert_eq!(outcome.added, 3);

    let memberships = MembershipStorage::new(pool.clone());
    let audience = memberships.user_ids_for_article(&article).await.unwrap();
    assert!(audience.contains(&no_answers));
}

#[tokio::test]
async fn test_rules_narrow_audience_to_matching_questionnaires() {
    let pool = setup_test_db().await;

    let on_pill = create_user(&pool, "pill@example.com").await;
    let off_pill = create_user(&pool, "nopill@example.com").await;
    let no_answers = create_user(&pool, "silent@example.com").await;
    submit_questionnaire(
        &pool,
        &on_pill,
        QuestionnaireInput {
            taking_pill: true,
            ..questionnaire_input()
        },
    )
    .await;
    submit_questionnaire(&pool, &off_pill, questionnaire_input()).await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let rules = RuleStorage::new(pool.clone());
    rules
        .create_rule(
            &article,
            RuleInput {
                operator: RuleOperator::Eq,
                value: RuleValue::Pill(true),
            },
        )
        .await
        .unwrap();

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    let outcome = synchronizer.resync_article(&article).await.unwrap();

    assert_eq!(outcome.target_size, 1);

    let memberships = MembershipStorage::new(pool.clone());
    let audience = memberships.user_ids_for_article(&article).await.unwrap();
    assert!(audience.contains(&on_pill));
    assert!(!audience.contains(&off_pill));
    assert!(!audience.contains(&no_answers));
}

#[tokio::test]
async fn test_resync_preserves_read_state_of_surviving_rows() {
    let pool = setup_test_db().await;

    let reader = create_user(&pool, "reader@example.com").await;
    submit_questionnaire(&pool, &reader, questionnaire_input()).await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    synchronizer.resync_article(&article).await.unwrap();

    let memberships = MembershipStorage::new(pool.clone());
    let before = memberships.mark_read(&reader, &article).await.unwrap();
    assert!(before.is_read);
    let read_at = before.read_at.expect("read_at set on first read");

    // New user joining the audience must not disturb the existing row
    let newcomer = create_user(&pool, "new@example.com").await;
    submit_questionnaire(&pool, &newcomer, questionnaire_input()).await;
    let outcome = synchronizer.resync_article(&article).await.unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.removed, 0);

    let after = memberships.mark_read(&reader, &article).await.unwrap();
    assert!(after.is_read);
    assert_eq!(after.read_at, Some(read_at));
}

#[tokio::test]
async fn test_rule_deletion_widens_audience_back_to_everyone() {
    let pool = setup_test_db().await;

    let matching = create_user(&pool, "match@example.com").await;
    let excluded = create_user(&pool, "excluded@example.com").await;
    submit_questionnaire(
        &pool,
        &matching,
        QuestionnaireInput {
            taking_pill: true,
            ..questionnaire_input()
        },
    )
    .await;
    submit_questionnaire(&pool, &excluded, questionnaire_input()).await;

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

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    let narrow = synchronizer.resync_article(&article).await.unwrap();
    assert_eq!(narrow.target_size, 1);

    rules.delete_rule(&rule.id).await.unwrap();
    let widened = synchronizer.resync_article(&article).await.unwrap();

    assert_eq!(widened.target_size, 2);
    assert_eq!(widened.added, 1);
    assert_eq!(widened.removed, 0);
}

#[tokio::test]
async fn test_resync_is_idempotent() {
    let pool = setup_test_db().await;

    let user = create_user(&pool, "user@example.com").await;
    submit_questionnaire(&pool, &user, questionnaire_input()).await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, true).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    let first = synchronizer.resync_article(&article).await.unwrap();
    let second = synchronizer.resync_article(&article).await.unwrap();

    assert_eq!(first.added, 1);
    assert_eq!(second.added, 0);
    assert_eq!(second.removed, 0);
    assert_eq!(second.target_size, first.target_size);
}

#[tokio::test]
async fn test_unpublished_article_is_not_synced() {
    let pool = setup_test_db().await;

    create_user(&pool, "user@example.com").await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let article = create_article(&pool, &category, false).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    let outcome = synchronizer.resync_article(&article).await.unwrap();

    assert!(!outcome.synced);

    let memberships = MembershipStorage::new(pool.clone());
    assert_eq!(memberships.count_for_article(&article).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unmanaged_category_never_gets_membership_rows() {
    let pool = setup_test_db().await;

    create_user(&pool, "user@example.com").await;

    let category = create_category(&pool, CategoryKind::Wellness).await;
    let article = create_article(&pool, &category, true).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    let outcome = synchronizer.resync_article(&article).await.unwrap();

    assert!(!outcome.synced);

    let memberships = MembershipStorage::new(pool.clone());
    assert_eq!(memberships.count_for_article(&article).await.unwrap(), 0);
}

#[tokio::test]
async fn test_ensure_membership_inserts_once() {
    let pool = setup_test_db().await;

    let user = create_user(&pool, "user@example.com").await;
    let category = create_category(&pool, CategoryKind::Initial).await;
    let article = create_article(&pool, &category, true).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    assert!(synchronizer.ensure_membership(&user, &article).await.unwrap());
    assert!(!synchronizer.ensure_membership(&user, &article).await.unwrap());

    let memberships = MembershipStorage::new(pool.clone());
    assert_eq!(memberships.count_for_article(&article).await.unwrap(), 1);
}

#[tokio::test]
async fn test_feed_hides_unpublished_articles() {
    let pool = setup_test_db().await;

    let user = create_user(&pool, "user@example.com").await;
    submit_questionnaire(&pool, &user, questionnaire_input()).await;

    let category = create_category(&pool, CategoryKind::CoreProgram).await;
    let published = create_article(&pool, &category, true).await;
    let draft = create_article(&pool, &category, false).await;

    let synchronizer = MembershipSynchronizer::new(pool.clone());
    synchronizer.resync_article(&published).await.unwrap();
    // Simulate a leftover row pointing at a draft
    synchronizer.ensure_membership(&user, &draft).await.unwrap();

    let memberships = MembershipStorage::new(pool.clone());
    let feed = memberships.list_visible_articles(&user).await.unwrap();

    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].article_id, published);
    assert!(!feed[0].is_read);
}
