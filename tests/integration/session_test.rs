//! Session integration tests.
//!
//! Drives a session over the in-memory gateway, holding individual responses
//! back to control the order in which concurrent fetches settle.

use db_atlas::catalog::Preview;
use db_atlas::console::{ExecutionStatus, EMPTY_RESULT_MESSAGE, GENERIC_FAILURE_MESSAGE};
use db_atlas::gateway::{row, MockGateway, RowSet, Value};
use db_atlas::session::Session;
use db_atlas::tabular::TabularView;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::Notify;

fn marker_rows(marker: &str) -> RowSet {
    RowSet::new(vec![row([("source", Value::from(marker))])])
}

/// Opens `shop` and waits for its tables.
async fn expand_shop(session: &mut Session) {
    session.toggle_database("shop");
    session.settle().await;
    assert_eq!(session.explorer().expanded_database(), Some("shop"));
}

/// Applies exactly one settled gateway call.
async fn apply_next(session: &mut Session) {
    let event = session.next_event().await.expect("session channel closed");
    session.apply(event);
}

#[tokio::test]
async fn test_load_lists_databases_in_service_order() {
    let gateway = Arc::new(MockGateway::demo());
    let mut session = Session::new(gateway.clone());

    session.load_databases();
    session.settle().await;

    assert_eq!(
        session.explorer().databases(),
        &["shop", "analytics", "archive"]
    );
    assert!(!session.explorer().is_loading());
    assert_eq!(gateway.list_calls(), 1);
}

#[tokio::test]
async fn test_listing_failure_leaves_empty_catalog() {
    let gateway = MockGateway::demo().with_list_failure("connection refused");
    let mut session = Session::new(Arc::new(gateway));

    session.load_databases();
    session.settle().await;

    assert!(session.explorer().databases().is_empty());
    assert!(!session.explorer().is_loading());
}

#[tokio::test]
async fn test_toggle_twice_collapses_without_second_fetch() {
    let gateway = Arc::new(MockGateway::demo());
    let mut session = Session::new(gateway.clone());

    expand_shop(&mut session).await;
    assert_eq!(session.explorer().expanded_tables(), &["customers", "orders"]);

    session.toggle_database("shop");
    assert_eq!(session.explorer().expanded_database(), None);
    assert_eq!(session.explorer().selected_table(), None);
    assert_eq!(session.in_flight(), 0);
    assert_eq!(gateway.detail_calls(), 1);
}

#[tokio::test]
async fn test_reexpand_uses_cached_detail() {
    let gateway = Arc::new(MockGateway::demo());
    let mut session = Session::new(gateway.clone());

    expand_shop(&mut session).await;
    session.toggle_database("analytics");
    session.settle().await;
    session.toggle_database("shop");

    assert_eq!(session.explorer().expanded_database(), Some("shop"));
    assert_eq!(session.in_flight(), 0);
    assert_eq!(gateway.detail_calls(), 2);
}

#[tokio::test]
async fn test_last_toggle_wins_over_pending_expansion() {
    let gateway = Arc::new(MockGateway::demo());
    let mut session = Session::new(gateway.clone());

    session.toggle_database("shop");
    session.toggle_database("analytics");
    session.settle().await;

    assert_eq!(session.explorer().expanded_database(), Some("analytics"));
    assert_eq!(session.explorer().expanding_database(), None);

    // The superseded detail was still cached
    session.toggle_database("shop");
    assert_eq!(session.explorer().expanded_database(), Some("shop"));
    assert_eq!(gateway.detail_calls(), 2);
}

#[tokio::test]
async fn test_detail_failure_keeps_database_collapsed() {
    let gateway = MockGateway::demo().with_detail_failure("shop", "access denied");
    let mut session = Session::new(Arc::new(gateway));

    session.toggle_database("shop");
    session.settle().await;

    assert_eq!(session.explorer().expanded_database(), None);
    assert_eq!(session.explorer().expanding_database(), None);
}

#[tokio::test]
async fn test_preview_shows_rows_of_selected_table() {
    let mut session = Session::new(Arc::new(MockGateway::demo()));
    expand_shop(&mut session).await;

    session.select_table("customers");
    assert_eq!(session.explorer().preview(), Some(&Preview::Loading));
    session.settle().await;

    let rows = session.explorer().rows().expect("preview rows");
    let view = TabularView::from_rows(rows).unwrap();
    assert_eq!(view.columns(), &["id", "name", "email"]);
    assert_eq!(view.cell(1, 2), Some("NULL"));
}

#[tokio::test]
async fn test_stale_preview_never_replaces_newer_selection() {
    let release = Arc::new(Notify::new());
    let gateway = MockGateway::demo()
        .with_preview("shop", "customers", marker_rows("customers"))
        .with_preview("shop", "orders", marker_rows("orders"))
        .with_preview_hold("shop", "customers", release.clone());
    let mut session = Session::new(Arc::new(gateway));
    expand_shop(&mut session).await;

    session.select_table("customers");
    session.select_table("orders");

    // orders settles while customers is still held
    apply_next(&mut session).await;
    assert_eq!(session.explorer().rows(), Some(&marker_rows("orders")));

    release.notify_one();
    apply_next(&mut session).await;

    assert_eq!(session.explorer().selected_table(), Some("orders"));
    assert_eq!(session.explorer().rows(), Some(&marker_rows("orders")));
    assert_eq!(session.in_flight(), 0);
}

#[tokio::test]
async fn test_collapse_discards_pending_preview() {
    let release = Arc::new(Notify::new());
    let gateway = MockGateway::demo().with_preview_hold("shop", "orders", release.clone());
    let mut session = Session::new(Arc::new(gateway));
    expand_shop(&mut session).await;

    session.select_table("orders");
    session.toggle_database("shop");
    release.notify_one();
    session.settle().await;

    assert_eq!(session.explorer().expanded_database(), None);
    assert_eq!(session.explorer().selected_table(), None);
    assert_eq!(session.explorer().preview(), None);
}

#[tokio::test]
async fn test_preview_failure_keeps_selection_without_data() {
    let gateway = MockGateway::demo().with_preview_failure("shop", "orders", "permission denied");
    let mut session = Session::new(Arc::new(gateway));
    expand_shop(&mut session).await;

    session.select_table("orders");
    session.settle().await;

    assert_eq!(session.explorer().selected_table(), Some("orders"));
    assert_eq!(session.explorer().preview(), Some(&Preview::Unavailable));
    assert_eq!(session.explorer().rows(), None);
}

#[tokio::test]
async fn test_empty_preview_has_no_table() {
    let mut session = Session::new(Arc::new(MockGateway::demo()));
    session.toggle_database("analytics");
    session.settle().await;

    session.select_table("events");
    session.settle().await;

    let rows = session.explorer().rows().expect("preview rows");
    assert!(rows.is_empty());
    assert_eq!(TabularView::from_rows(rows), None);
}

#[tokio::test]
async fn test_execute_while_running_issues_one_call() {
    let release = Arc::new(Notify::new());
    let gateway = Arc::new(MockGateway::demo().with_query_hold(release.clone()));
    let mut session = Session::new(gateway.clone());

    session.set_query_text("SELECT 1");
    session.execute();
    session.execute();
    assert_eq!(session.in_flight(), 1);

    release.notify_one();
    session.settle().await;

    assert_eq!(gateway.query_calls(), 1);
    assert_eq!(session.console().status(), ExecutionStatus::Succeeded);
}

#[tokio::test]
async fn test_execute_zero_rows_reports_success_message() {
    let mut session = Session::new(Arc::new(MockGateway::demo()));

    session.set_query_text("UPDATE orders SET shipped = 1");
    session.execute();
    session.settle().await;

    let console = session.console();
    assert_eq!(console.status(), ExecutionStatus::Succeeded);
    assert_eq!(console.message(), Some(EMPTY_RESULT_MESSAGE));
    assert!(!console.is_error());
}

#[tokio::test]
async fn test_execute_failure_shows_service_detail() {
    let gateway = MockGateway::demo()
        .with_query_failure("SELEC 1", Some("syntax error near SELECT".to_string()));
    let mut session = Session::new(Arc::new(gateway));

    session.set_query_text("  SELEC 1  ");
    session.execute();
    session.settle().await;

    let console = session.console();
    assert_eq!(console.status(), ExecutionStatus::Failed);
    assert_eq!(console.message(), Some("syntax error near SELECT"));
    assert_eq!(console.rows(), None);
    assert!(console.is_error());
}

#[tokio::test]
async fn test_execute_failure_without_detail_uses_fallback() {
    let gateway = MockGateway::demo().with_query_failure("SELECT 1", None);
    let mut session = Session::new(Arc::new(gateway));

    session.set_query_text("SELECT 1");
    session.execute();
    session.settle().await;

    assert_eq!(session.console().message(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_query_and_preview_run_concurrently() {
    let release = Arc::new(Notify::new());
    let gateway = MockGateway::demo().with_query_hold(release.clone());
    let mut session = Session::new(Arc::new(gateway));
    expand_shop(&mut session).await;

    session.set_query_text("SELECT 1");
    session.execute();
    session.select_table("orders");

    // The preview settles while the query is still held
    apply_next(&mut session).await;
    assert!(session.explorer().rows().is_some());
    assert!(session.console().is_running());

    release.notify_one();
    session.settle().await;
    assert_eq!(session.console().status(), ExecutionStatus::Succeeded);
}
