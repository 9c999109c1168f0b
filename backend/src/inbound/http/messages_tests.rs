//! Handler tests for messaging endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::rides::MessageList;
use crate::inbound::http::test_utils::{TestContext, bearer, context, test_app};

#[rstest]
#[actix_web::test]
async fn participants_exchange_and_read_messages(context: TestContext) {
    let (driver, driver_token) = context.sign_up("drew@example.com", None).await;
    let (rider, rider_token) = context.sign_up("rae@example.com", None).await;
    let ride = context.paired_ride(driver, rider).await;
    let app = test::init_service(test_app(context.state.clone())).await;

    let send = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(&driver_token))
        .set_json(json!({
            "ride_id": ride.to_string(),
            "receiver_id": rider.to_string(),
            "content": " Running five minutes late "
        }))
        .to_request();
    let sent: MessageEnvelope = test::call_and_read_body_json(&app, send).await;
    assert_eq!(sent.message, "Message sent successfully");
    assert_eq!(sent.data.content, "Running five minutes late");
    assert!(!sent.data.is_read);

    let by_sender = test::TestRequest::post()
        .uri(&format!("/messages/{}/read", sent.data.id))
        .insert_header(bearer(&driver_token))
        .to_request();
    let response = test::call_service(&app, by_sender).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let read = test::TestRequest::post()
            .uri(&format!("/messages/{}/read", sent.data.id))
            .insert_header(bearer(&rider_token))
            .to_request();
        let marked: MessageEnvelope = test::call_and_read_body_json(&app, read).await;
        assert_eq!(marked.message, "Message marked as read");
        assert!(marked.data.is_read);
    }

    let list = test::TestRequest::get()
        .uri(&format!("/rides/{ride}/messages"))
        .insert_header(bearer(&rider_token))
        .to_request();
    let listed: MessageList = test::call_and_read_body_json(&app, list).await;
    assert_eq!(listed.messages.len(), 1);
    assert!(listed.messages[0].is_read);
}

#[rstest]
#[actix_web::test]
async fn outsiders_cannot_send(context: TestContext) {
    let (driver, _) = context.sign_up("drew@example.com", None).await;
    let (rider, _) = context.sign_up("rae@example.com", None).await;
    let (_, outsider_token) = context.sign_up("otto@example.com", None).await;
    let ride = context.paired_ride(driver, rider).await;
    let app = test::init_service(test_app(context.state.clone())).await;
    let request = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(&outsider_token))
        .set_json(json!({
            "ride_id": ride.to_string(),
            "receiver_id": rider.to_string(),
            "content": "hello"
        }))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Not authorized to send messages for this ride")
    );
}

#[rstest]
#[actix_web::test]
async fn unknown_ride_is_not_found(context: TestContext) {
    let (_, token) = context.sign_up("drew@example.com", None).await;
    let (rider, _) = context.sign_up("rae@example.com", None).await;
    let app = test::init_service(test_app(context.state.clone())).await;
    let request = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(&token))
        .set_json(json!({
            "ride_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "receiver_id": rider.to_string(),
            "content": "hello"
        }))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case("not-a-uuid", StatusCode::BAD_REQUEST)]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn mark_read_reports_bad_or_unknown_ids(
    context: TestContext,
    #[case] message_id: &str,
    #[case] expected: StatusCode,
) {
    let token = context.token_for_new_user("rae@example.com").await;
    let app = test::init_service(test_app(context.state.clone())).await;
    let request = test::TestRequest::post()
        .uri(&format!("/messages/{message_id}/read"))
        .insert_header(bearer(&token))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), expected);
}
