//! Org page and membership end-to-end tests.

use reqwest::StatusCode;
use serde_json::json;
use tollgate_tests::fixtures::{
    VERIFICATION_KEY, bigco, bigco_added_users, bigco_users, bob_subscriptions, membership,
    sponsorship,
};
use tollgate_tests::{ApiTestClient, RenderedView, TestContext, location};
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADD_BETTY: [(&str, &str); 3] = [
    ("username", "betty"),
    ("role", "developer"),
    ("updateType", "addUser"),
];
const REMOVE_BETTY: [(&str, &str); 2] = [("username", "betty"), ("updateType", "deleteUser")];

async fn mount_subscriptions(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/customer/bob/stripe/subscription"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_org(server: &MockServer, users: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/org/bigco"))
        .and(header("bearer", "bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bigco()))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/org/bigco/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_add_member(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path("/org/bigco/user"))
        .and(header("bearer", "bob"))
        .and(body_json(json!({"user": "betty", "role": "developer"})))
        .respond_with(ResponseTemplate::new(status).set_body_json(membership(None)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_extend(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path("/sponsorship/1"))
        .and(body_json(json!({"npm_user": "betty"})))
        .respond_with(ResponseTemplate::new(status).set_body_json(sponsorship(None, None)))
        .expect(1)
        .mount(server)
        .await;
}

/// No membership may be removed and no further org call made.
async fn forbid_rollback(server: &MockServer) {
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

async fn post(ctx: &TestContext, form: &[(&str, &str)]) -> RenderedView {
    let resp = ctx.client.post_form("/org/bigco", form).await.unwrap();
    RenderedView::from_response(resp).await.unwrap()
}

#[tokio::test]
async fn test_org_page_without_sponsorships() {
    let ctx = TestContext::new().await.unwrap();
    mount_org(&ctx.users, bigco_users()).await;
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    Mock::given(method("GET"))
        .and(path("/sponsorship/1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&ctx.license)
        .await;

    let view = RenderedView::from_response(ctx.client.get("/org/bigco").await.unwrap())
        .await
        .unwrap();

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.template, "org/info");
    assert_eq!(view.context["org"]["users"][0]["name"], "bob");
    assert!(!view.has("sponsorships"));
}

#[tokio::test]
async fn test_org_page_with_sponsorships() {
    let ctx = TestContext::new().await.unwrap();
    mount_org(&ctx.users, bigco_users()).await;
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    Mock::given(method("GET"))
        .and(path("/sponsorship/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([sponsorship(Some(true), None)])),
        )
        .expect(1)
        .mount(&ctx.license)
        .await;

    let view = RenderedView::from_response(ctx.client.get("/org/bigco").await.unwrap())
        .await
        .unwrap();

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.context["sponsorships"][0]["npm_user"], "betty");
}

#[tokio::test]
async fn test_org_page_for_missing_org() {
    let ctx = TestContext::new().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/org/bigco"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&ctx.users)
        .await;
    mount_subscriptions(
        &ctx.billing,
        200,
        json!([{"id": "sub_abcd", "license_id": 7, "npm_org": "_private-modules-bob"}]),
    )
    .await;

    let view = RenderedView::from_response(ctx.client.get("/org/bigco").await.unwrap())
        .await
        .unwrap();

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.template, "org/info");
    assert!(!view.has("org"));
    assert!(!view.has("sponsorships"));
}

#[tokio::test]
async fn test_add_user_when_org_rejects_member() {
    let ctx = TestContext::new().await.unwrap();
    Mock::given(method("PUT"))
        .and(path("/org/bigco/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json("bob is not a super-admin"))
        .expect(1)
        .mount(&ctx.users)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.billing)
        .await;

    let view = post(&ctx, &ADD_BETTY).await;

    assert_eq!(view.status, StatusCode::UNAUTHORIZED);
    assert_eq!(view.template, "errors/internal");
    assert_eq!(view.context["step"], "add member");
}

#[tokio::test]
async fn test_add_user_without_org_license() {
    let ctx = TestContext::new().await.unwrap();
    mount_add_member(&ctx.users, 200).await;
    mount_subscriptions(&ctx.billing, 200, json!([])).await;
    forbid_rollback(&ctx.users).await;

    let view = post(&ctx, &ADD_BETTY).await;

    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.template, "errors/internal");
    assert_eq!(view.context["message"], "No org with that name exists");
}

#[tokio::test]
async fn test_add_user_when_sponsorship_cannot_be_extended() {
    let ctx = TestContext::new().await.unwrap();
    mount_add_member(&ctx.users, 200).await;
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    mount_extend(&ctx.license, 404).await;
    forbid_rollback(&ctx.users).await;
    forbid_rollback(&ctx.license).await;

    let view = post(&ctx, &ADD_BETTY).await;

    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.context["message"], "License not found: 1");
}

#[tokio::test]
async fn test_add_user_when_sponsorship_cannot_be_accepted() {
    let ctx = TestContext::new().await.unwrap();
    mount_add_member(&ctx.users, 200).await;
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    mount_extend(&ctx.license, 200).await;
    Mock::given(method("POST"))
        .and(path(format!("/sponsorship/{VERIFICATION_KEY}")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&ctx.license)
        .await;
    forbid_rollback(&ctx.users).await;
    forbid_rollback(&ctx.license).await;

    let view = post(&ctx, &ADD_BETTY).await;

    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.context["message"], "verification key not found");
    assert_eq!(view.context["step"], "accept sponsorship");
}

#[tokio::test]
async fn test_add_user() {
    let ctx = TestContext::new().await.unwrap();
    mount_add_member(&ctx.users, 200).await;
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    mount_extend(&ctx.license, 200).await;
    Mock::given(method("POST"))
        .and(path(format!("/sponsorship/{VERIFICATION_KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sponsorship(Some(true), None)))
        .expect(1)
        .mount(&ctx.license)
        .await;
    mount_org(&ctx.users, bigco_added_users()).await;

    let view = post(&ctx, &ADD_BETTY).await;

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.template, "org/info");
    assert_eq!(view.context["org"]["users"][1]["name"], "betty");
}

#[tokio::test]
async fn test_remove_user_without_org_license() {
    let ctx = TestContext::new().await.unwrap();
    mount_subscriptions(&ctx.billing, 404, json!(null)).await;
    forbid_rollback(&ctx.users).await;

    let view = post(&ctx, &REMOVE_BETTY).await;

    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.template, "errors/internal");
}

#[tokio::test]
async fn test_remove_user_when_sponsorship_cannot_be_revoked() {
    let ctx = TestContext::new().await.unwrap();
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    Mock::given(method("DELETE"))
        .and(path("/sponsorship/1/betty"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&ctx.license)
        .await;
    forbid_rollback(&ctx.users).await;

    let view = post(&ctx, &REMOVE_BETTY).await;

    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.context["message"], "user or licenseId not found");
}

#[tokio::test]
async fn test_remove_user_when_org_cannot_remove_member() {
    let ctx = TestContext::new().await.unwrap();
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    Mock::given(method("DELETE"))
        .and(path("/sponsorship/1/betty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sponsorship(
            None,
            Some("2015-08-05T15:30:46.970Z"),
        )))
        .expect(1)
        .mount(&ctx.license)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/org/bigco/user/betty"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&ctx.users)
        .await;

    let view = post(&ctx, &REMOVE_BETTY).await;

    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.template, "errors/internal");
    assert_eq!(view.context["step"], "remove member");
}

#[tokio::test]
async fn test_remove_user() {
    let ctx = TestContext::new().await.unwrap();
    mount_subscriptions(&ctx.billing, 200, bob_subscriptions()).await;
    Mock::given(method("DELETE"))
        .and(path("/sponsorship/1/betty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sponsorship(
            None,
            Some("2015-08-05T15:30:46.970Z"),
        )))
        .expect(1)
        .mount(&ctx.license)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/org/bigco/user/betty"))
        .and(header("bearer", "bob"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(membership(Some("2015-08-05T15:30:46.970Z"))),
        )
        .expect(1)
        .mount(&ctx.users)
        .await;
    mount_org(&ctx.users, bigco_users()).await;

    let view = post(&ctx, &REMOVE_BETTY).await;

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.template, "org/info");
    assert_eq!(view.context["org"]["info"]["name"], "bigco");
}

#[tokio::test]
async fn test_unknown_update_type() {
    let ctx = TestContext::new().await.unwrap();
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.users)
        .await;

    let view = post(&ctx, &[("username", "betty"), ("updateType", "promote")]).await;

    assert_eq!(view.status, StatusCode::BAD_REQUEST);
    assert_eq!(view.context["message"], "unknown update type: promote");
}

#[tokio::test]
async fn test_delete_org() {
    let ctx = TestContext::new().await.unwrap();
    Mock::given(method("DELETE"))
        .and(path("/org/bigco"))
        .and(header("bearer", "bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bigco()))
        .expect(1)
        .mount(&ctx.users)
        .await;

    let resp = ctx.client.delete("/org/bigco").await.unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/org/bigco?deleted=1"));
}

#[tokio::test]
async fn test_delete_org_failure() {
    let ctx = TestContext::new().await.unwrap();
    Mock::given(method("DELETE"))
        .and(path("/org/bigco"))
        .and(header("bearer", "betty"))
        .respond_with(ResponseTemplate::new(403).set_body_json("betty is not a super-admin"))
        .expect(1)
        .mount(&ctx.users)
        .await;

    let betty = ApiTestClient::new(ctx.addr, "betty");
    let view = RenderedView::from_response(betty.delete("/org/bigco").await.unwrap())
        .await
        .unwrap();

    assert_eq!(view.status, StatusCode::FORBIDDEN);
    assert_eq!(view.template, "errors/internal");
    assert_eq!(view.context["message"], "betty is not a super-admin");
}

#[tokio::test]
async fn test_update_without_username_makes_no_calls() {
    let ctx = TestContext::new().await.unwrap();
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.users)
        .await;

    let view = post(&ctx, &[("updateType", "addUser")]).await;

    assert_eq!(view.status, StatusCode::BAD_REQUEST);
    assert_eq!(view.template, "errors/internal");
}
