//! Integration tests for the request context: token lifecycle, URLs and isolation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Duration as ChronoDuration;
use std::time::Duration;
use token_broker::{
    App, BrokerConfig, BrokerError, Context, Provider, TokenRecord, TokenResponse, TokenStore,
    UserId,
    mocks::{MockKeyValueStore, MockTokenExchanger},
};
use token_broker_core::environment::Clock;
use token_broker_testing::{FixedClock, ManualClock, test_clock};

type TestApp = App<MockKeyValueStore, MockTokenExchanger, FixedClock>;
type TestContext = Context<MockKeyValueStore, MockTokenExchanger, FixedClock>;

fn create_test_app(kv: MockKeyValueStore, exchanger: MockTokenExchanger) -> TestApp {
    App::new(
        BrokerConfig::new("https://example.com".to_string()),
        kv,
        exchanger,
        test_clock(),
    )
}

fn refreshed(refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: "foo2".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        token_type: "Bearer2".to_string(),
        expiry: Some(test_clock().now() + ChronoDuration::hours(2)),
    }
}

fn stale_record() -> TokenRecord {
    TokenRecord {
        access_token: "foo".to_string(),
        refresh_token: "bar".to_string(),
        token_type: "Bearer".to_string(),
        expiry: Some(test_clock().now() - ChronoDuration::hours(10)),
    }
}

fn as_user(ctx: TestContext, id: &str) -> TestContext {
    ctx.with_user(UserId::new(id).unwrap())
}

#[test]
fn test_urls() {
    let app = create_test_app(MockKeyValueStore::new(), MockTokenExchanger::failing());
    let ctx = app.create_context();

    assert_eq!(ctx.crm_callback_url(), "https://example.com/oauth/crm/callback");
    assert_eq!(
        ctx.crm_authenticate_url(&["foo"]),
        "https://example.com/oauth/crm/authenticate/foo"
    );
    assert_eq!(ctx.chat_callback_url(), "https://example.com/oauth/chat/callback");
    assert_eq!(
        ctx.chat_authenticate_url(&["foo", "bar"]),
        "https://example.com/oauth/chat/authenticate/foo/bar"
    );
}

#[test]
fn test_creating_context_does_not_touch_store() {
    // Every store call would fail; context creation must not make any.
    let app = create_test_app(MockKeyValueStore::failing(), MockTokenExchanger::failing());
    let ctx = as_user(app.create_context(), "FOO");

    assert_eq!(ctx.user_id().map(UserId::as_str), Some("FOO"));
    assert_eq!(ctx.timeout(), app.config().timeout);
}

#[tokio::test]
async fn test_set_and_get_crm_token() {
    let kv = MockKeyValueStore::new();
    let app = create_test_app(kv.clone(), MockTokenExchanger::failing());
    let token = stale_record();

    let mut ctx = app.create_context();
    assert_eq!(ctx.set_crm_token(token.clone()).await, Err(BrokerError::Unauthenticated));
    assert_eq!(kv.write_count(), 0);

    ctx.set_user(Some(UserId::new("FOO").unwrap()));
    ctx.set_crm_token(token.clone()).await.unwrap();

    let stored = ctx.crm_token_for_user().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "foo");
    assert_eq!(stored.refresh_token, "bar");
    assert_eq!(stored.token_type, "Bearer");
    assert_eq!(stored, token);

    let other = as_user(app.create_context(), "BAR");
    assert_eq!(other.crm_token_for_user().await.unwrap(), None);
}

#[tokio::test]
async fn test_set_and_get_chat_token() {
    let app = create_test_app(MockKeyValueStore::new(), MockTokenExchanger::failing());

    let mut ctx = app.create_context();
    assert_eq!(ctx.set_chat_token("foo").await, Err(BrokerError::Unauthenticated));
    assert_eq!(ctx.chat_token_for_user().await.unwrap(), "");

    ctx.set_user(Some(UserId::new("FOO").unwrap()));
    ctx.set_chat_token("foo").await.unwrap();
    assert_eq!(ctx.chat_token_for_user().await.unwrap(), "foo");

    let other = as_user(app.create_context(), "BAR");
    assert_eq!(other.chat_token_for_user().await.unwrap(), "");
}

#[tokio::test]
async fn test_reads_without_user_are_empty_and_side_effect_free() {
    let kv = MockKeyValueStore::new();
    let exchanger = MockTokenExchanger::new(refreshed(Some("bar2")));
    let app = create_test_app(kv.clone(), exchanger.clone());
    let ctx = app.create_context();

    assert_eq!(ctx.crm_token_for_user().await.unwrap(), None);
    assert_eq!(ctx.chat_token_for_user().await.unwrap(), "");
    assert!(!ctx.crm_client().await.unwrap().is_authenticated());

    assert_eq!(kv.write_count(), 0);
    assert_eq!(exchanger.call_count(), 0);
}

#[tokio::test]
async fn test_crm_client_refreshes_and_persists_stale_token() {
    let exchanger = MockTokenExchanger::new(refreshed(Some("bar2")));
    let app = create_test_app(MockKeyValueStore::new(), exchanger.clone());
    let ctx = as_user(app.create_context(), "FOO").with_timeout(Duration::from_secs(2 * 60 * 60));

    ctx.set_crm_token(stale_record()).await.unwrap();
    let before = ctx.crm_token_for_user().await.unwrap().unwrap();
    assert_eq!(before, stale_record());

    let client = ctx.crm_client().await.unwrap();
    assert!(client.is_authenticated());
    assert_eq!(client.authorization_header().as_deref(), Some("Bearer2 foo2"));

    let after = ctx.crm_token_for_user().await.unwrap().unwrap();
    assert_eq!(after.access_token, "foo2");
    assert_eq!(after.refresh_token, "bar2");
    assert_eq!(after.token_type, "Bearer2");
    assert_eq!(after.expiry, Some(test_clock().now() + ChronoDuration::hours(2)));
    assert_eq!(exchanger.refresh_tokens_seen(), vec!["bar".to_string()]);
}

#[tokio::test]
async fn test_refresh_without_new_refresh_token_keeps_old_one() {
    let app = create_test_app(MockKeyValueStore::new(), MockTokenExchanger::new(refreshed(None)));
    let ctx = as_user(app.create_context(), "FOO");

    ctx.set_crm_token(stale_record()).await.unwrap();
    ctx.crm_client().await.unwrap();

    let after = ctx.crm_token_for_user().await.unwrap().unwrap();
    assert_eq!(after.access_token, "foo2");
    assert_eq!(after.refresh_token, "bar");
}

#[tokio::test]
async fn test_staleness_boundary() {
    let now = test_clock().now();
    let exchanger = MockTokenExchanger::new(refreshed(Some("bar2")));
    let app = create_test_app(MockKeyValueStore::new(), exchanger.clone());
    let ctx = as_user(app.create_context(), "FOO");

    let mut just_fresh = stale_record();
    just_fresh.expiry = Some(now + ChronoDuration::milliseconds(1));
    ctx.set_crm_token(just_fresh.clone()).await.unwrap();
    ctx.crm_client().await.unwrap();
    assert_eq!(exchanger.call_count(), 0);
    assert_eq!(ctx.crm_token_for_user().await.unwrap(), Some(just_fresh));

    let mut exactly_now = stale_record();
    exactly_now.expiry = Some(now);
    ctx.set_crm_token(exactly_now).await.unwrap();
    ctx.crm_client().await.unwrap();
    assert_eq!(exchanger.call_count(), 1);
}

#[tokio::test]
async fn test_failed_refresh_is_surfaced_and_state_kept() {
    let app = create_test_app(MockKeyValueStore::new(), MockTokenExchanger::failing());
    let ctx = as_user(app.create_context(), "FOO");

    ctx.set_crm_token(stale_record()).await.unwrap();
    let error = ctx.crm_client().await.unwrap_err();

    assert!(error.is_refresh_failure());
    assert!(error.is_retryable());
    assert_eq!(ctx.crm_token_for_user().await.unwrap(), Some(stale_record()));
}

#[tokio::test]
async fn test_store_unavailable_is_surfaced() {
    let app = create_test_app(MockKeyValueStore::failing(), MockTokenExchanger::failing());
    let ctx = as_user(app.create_context(), "FOO");

    assert!(matches!(
        ctx.crm_token_for_user().await,
        Err(BrokerError::StoreUnavailable(_))
    ));
    assert!(matches!(
        ctx.set_chat_token("foo").await,
        Err(BrokerError::StoreUnavailable(_))
    ));
    assert!(matches!(ctx.crm_client().await, Err(BrokerError::StoreUnavailable(_))));
}

#[tokio::test]
async fn test_users_are_isolated() {
    let kv = MockKeyValueStore::new();
    let exchanger = MockTokenExchanger::new(refreshed(Some("bar2")));
    let app = create_test_app(kv.clone(), exchanger);

    let bar = as_user(app.create_context(), "BAR");
    let mut bar_token = stale_record();
    bar_token.access_token = "bar-access".to_string();
    bar.set_crm_token(bar_token.clone()).await.unwrap();
    bar.set_chat_token("bar-chat").await.unwrap();

    let foo = as_user(app.create_context(), "FOO");
    foo.set_crm_token(stale_record()).await.unwrap();
    foo.set_chat_token("foo-chat").await.unwrap();
    foo.crm_client().await.unwrap();
    foo.delete_chat_token().await.unwrap();

    assert_eq!(bar.crm_token_for_user().await.unwrap(), Some(bar_token));
    assert_eq!(bar.chat_token_for_user().await.unwrap(), "bar-chat");
    assert_eq!(foo.chat_token_for_user().await.unwrap(), "");
    assert!(kv.raw(&TokenStore::<MockKeyValueStore>::token_key(
        &UserId::new("BAR").unwrap(),
        Provider::Crm
    ))
    .is_some());
}

#[tokio::test]
async fn test_delete_crm_token() {
    let app = create_test_app(MockKeyValueStore::new(), MockTokenExchanger::failing());
    let ctx = as_user(app.create_context(), "FOO");

    ctx.set_crm_token(stale_record()).await.unwrap();
    ctx.delete_crm_token().await.unwrap();

    assert_eq!(ctx.crm_token_for_user().await.unwrap(), None);
    assert_eq!(
        app.create_context().delete_crm_token().await,
        Err(BrokerError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_context_reads_through_to_store_every_time() {
    let kv = MockKeyValueStore::new();
    let app = create_test_app(kv.clone(), MockTokenExchanger::failing());
    let reader = as_user(app.create_context(), "FOO");
    let writer = as_user(app.create_context(), "FOO");

    writer.set_chat_token("first").await.unwrap();
    assert_eq!(reader.chat_token_for_user().await.unwrap(), "first");

    writer.set_chat_token("second").await.unwrap();
    assert_eq!(reader.chat_token_for_user().await.unwrap(), "second");
}

#[tokio::test]
async fn test_token_goes_stale_as_time_passes() {
    let clock = ManualClock::new(test_clock().now());
    let exchanger = MockTokenExchanger::new(refreshed(Some("bar2")));
    let app = App::new(
        BrokerConfig::new("https://example.com".to_string()),
        MockKeyValueStore::new(),
        exchanger.clone(),
        clock.clone(),
    );
    let user = UserId::new("FOO").unwrap();

    let mut record = stale_record();
    record.expiry = Some(clock.now() + ChronoDuration::minutes(30));
    app.create_context()
        .with_user(user.clone())
        .set_crm_token(record)
        .await
        .unwrap();

    let client = app.create_context().with_user(user.clone()).crm_client().await.unwrap();
    assert_eq!(client.token().unwrap().access_token, "foo");
    assert_eq!(exchanger.call_count(), 0);

    clock.advance(ChronoDuration::minutes(30));

    let client = app.create_context().with_user(user).crm_client().await.unwrap();
    assert_eq!(client.token().unwrap().access_token, "foo2");
    assert_eq!(exchanger.refresh_tokens_seen(), vec!["bar".to_string()]);
}
