//! Item listing, reporting and administrative status changes.

use assert_matches::assert_matches;
use finder_app::views::{ItemFilter, ItemQuery};
use finder_app::workflows::{self, items, Confirmation};
use finder_app::Screen;
use finder_core::{FinderError, ItemId, ItemStatus, UserId};
use finder_testkit::{fixtures, Endpoint, TestHarness};

fn seeded_listing(harness: &TestHarness) {
    harness.api.seed_items([
        fixtures::item(1, "Umbrella", ItemStatus::Lost, 1),
        fixtures::item(2, "Calculator", ItemStatus::Found, 2),
        fixtures::item(3, "ID Lace", ItemStatus::Lost, 2),
        fixtures::item(4, "Tumbler", ItemStatus::Claimed, 1),
        fixtures::item(5, "Notebook", ItemStatus::Lost, 1),
        fixtures::item(6, "Jacket", ItemStatus::Reunited, 2),
    ]);
}

#[tokio::test]
async fn lost_filter_keeps_server_order() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::bob()).await.unwrap();
    workflows::load_items(&harness.app_core).await.unwrap();

    let lost = items::list(&harness.app_core, &ItemQuery::status(ItemFilter::Lost)).await;
    let ids: Vec<_> = lost.iter().map(|i| i.item_id).collect();
    assert_eq!(ids, vec![ItemId(1), ItemId(3), ItemId(5)]);

    let ended = items::list(&harness.app_core, &ItemQuery::status(ItemFilter::Reunited)).await;
    let ids: Vec<_> = ended.iter().map(|i| i.item_id).collect();
    assert_eq!(ids, vec![ItemId(4), ItemId(6)]);
}

#[tokio::test]
async fn reported_item_takes_campus_as_location() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();

    let created = workflows::report_item(
        &harness.app_core,
        &fixtures::draft("Blue Backpack", ItemStatus::Found),
    )
    .await
    .unwrap();

    assert_eq!(created.title, "Blue Backpack");
    assert_eq!(created.location, "Main Campus");
    assert_eq!(created.status, ItemStatus::Found);
    assert_eq!(created.reporter_id, Some(UserId(2)));

    let core = harness.app_core.read().await;
    assert_eq!(core.items().mine().first().map(|i| i.item_id), Some(created.item_id));
    assert!(items::reported_message(&created).contains("Main Campus"));
}

#[tokio::test]
async fn report_with_unknown_category_is_refused_before_sending() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();
    let mut draft = fixtures::draft("Blue Backpack", ItemStatus::Found);
    draft.category_id = Some(finder_core::CategoryId(99));

    let err = workflows::report_item(&harness.app_core, &draft).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(harness.api.count_calls(|c| *c == Endpoint::ReportItem), 0);
}

#[tokio::test]
async fn failed_refresh_after_report_keeps_the_report() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();
    harness
        .api
        .fail(Endpoint::ItemsByUser(UserId(2)), FinderError::network("timeout"));

    let created = workflows::report_item(
        &harness.app_core,
        &fixtures::draft("Blue Backpack", ItemStatus::Found),
    )
    .await
    .unwrap();
    let core = harness.app_core.read().await;
    assert_eq!(core.items().mine().len(), 1);
    assert_eq!(core.items().mine()[0].item_id, created.item_id);
}

#[tokio::test]
async fn duplicate_report_is_refused_while_first_is_pending() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();
    workflows::load_reference_data(&harness.app_core).await.unwrap();
    let release = harness.api.hold(Endpoint::ReportItem);
    let draft = fixtures::draft("Blue Backpack", ItemStatus::Found);

    let (first, second) = futures::join!(
        workflows::report_item(&harness.app_core, &draft),
        async {
            let second = workflows::report_item(&harness.app_core, &draft).await;
            drop(release);
            second
        }
    );

    assert!(first.is_ok());
    assert_matches!(second, Err(FinderError::InProgress { .. }));
    assert_eq!(harness.api.items().len(), 1);
}

#[tokio::test]
async fn stale_listing_is_dropped_after_navigation() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::bob()).await.unwrap();
    let release = harness.api.hold(Endpoint::ListItems);

    let (loaded, _) = futures::join!(workflows::load_items(&harness.app_core), async {
        harness.navigate(Screen::Profile).await;
        drop(release);
    });

    assert_eq!(loaded.unwrap().len(), 6);
    assert!(harness.app_core.read().await.items().all().is_empty());
}

#[tokio::test]
async fn stats_fall_back_to_the_listing() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::bob()).await.unwrap();
    harness
        .api
        .fail(Endpoint::ItemStats, FinderError::server(404, "Not Found"));

    let stats = workflows::load_stats(&harness.app_core).await.unwrap();
    assert_eq!(stats.lost, 3);
    assert_eq!(stats.found, 1);
    assert_eq!(stats.active, 4);

    let core = harness.app_core.read().await;
    assert_eq!(core.items().stats(), Some(stats));
    assert_eq!(core.items().report_count(UserId(1)), 3);
}

#[tokio::test]
async fn admin_status_change_follows_the_lifecycle() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::admin()).await.unwrap();
    workflows::load_items(&harness.app_core).await.unwrap();

    let claimed = workflows::set_item_status(&harness.app_core, ItemId(1), ItemStatus::Claimed)
        .await
        .unwrap();
    assert_eq!(claimed.status, ItemStatus::Claimed);

    let err = workflows::set_item_status(&harness.app_core, ItemId(1), ItemStatus::Lost)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        harness.api.count_calls(|c| *c == Endpoint::UpdateItem(ItemId(1))),
        1
    );
}

#[tokio::test]
async fn status_change_requires_admin() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::alice()).await.unwrap();
    workflows::load_items(&harness.app_core).await.unwrap();

    let err = workflows::set_item_status(&harness.app_core, ItemId(1), ItemStatus::Returned)
        .await
        .unwrap_err();
    assert_matches!(err, FinderError::Permission { .. });
}

#[tokio::test]
async fn edit_by_another_user_is_refused() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::bob()).await.unwrap();
    workflows::load_items(&harness.app_core).await.unwrap();

    let draft = items::ItemDraft::from_item(&fixtures::item(1, "Umbrella", ItemStatus::Lost, 1));
    let err = workflows::edit_item(&harness.app_core, ItemId(1), &draft)
        .await
        .unwrap_err();
    assert_matches!(err, FinderError::Permission { .. });
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::alice()).await.unwrap();
    harness.api.reset_calls();

    let deleted = workflows::delete_item(&harness.app_core, ItemId(1), Confirmation::Declined)
        .await
        .unwrap();
    assert!(!deleted);
    assert_eq!(harness.api.call_count(), 0);

    let deleted = workflows::delete_item(&harness.app_core, ItemId(1), Confirmation::Confirmed)
        .await
        .unwrap();
    assert!(deleted);
    assert!(harness.api.item(ItemId(1)).is_none());
}

#[tokio::test]
async fn incomplete_report_makes_no_request() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();
    harness
        .api
        .fail(Endpoint::Categories, FinderError::network("offline"));
    harness.api.reset_calls();

    let mut draft = fixtures::draft("Blue Backpack", ItemStatus::Found);
    draft.title = "  ".into();
    let err = workflows::report_item(&harness.app_core, &draft)
        .await
        .unwrap_err();

    assert_matches!(err, FinderError::Validation { field, .. } if field == "itemTitle");
    assert_eq!(harness.api.call_count(), 0);
}

#[tokio::test]
async fn incomplete_edit_makes_no_request() {
    let harness = TestHarness::new();
    seeded_listing(&harness);
    harness.sign_in(&fixtures::alice()).await.unwrap();
    workflows::load_items(&harness.app_core).await.unwrap();
    harness.api.reset_calls();

    let umbrella = fixtures::item(1, "Umbrella", ItemStatus::Lost, 1);
    let mut draft = items::ItemDraft::from_item(&umbrella);
    draft.description.clear();
    let err = workflows::edit_item(&harness.app_core, ItemId(1), &draft)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(harness.api.call_count(), 0);
}

#[tokio::test]
async fn rejected_credential_on_a_listing_signs_out() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();
    harness.api.fail(
        Endpoint::ListItems,
        FinderError::auth(finder_core::AuthFailure::InvalidToken, "Session expired"),
    );

    let err = workflows::load_items(&harness.app_core).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(harness.screen().await, Screen::Login);
    assert!(harness.snapshot().await.identity().is_none());
}
