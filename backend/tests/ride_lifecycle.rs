//! End-to-end ride flow over the HTTP surface with in-memory adapters.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use carpool_backend::Trace;
use carpool_backend::inbound::http::configure_api;
use carpool_backend::test_support::{FixtureClock, InMemoryStore, in_memory_http_state};
use rstest::rstest;
use serde_json::{Value, json};

fn text<'a>(body: &'a Value, pointer: &str) -> &'a str {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("{pointer} missing from {body}"))
}

async fn send<S>(app: &S, request: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body: Value = test::read_body_json(response).await;
    (status, body)
}

fn authed(request: test::TestRequest, token: &str) -> test::TestRequest {
    request.insert_header(("Authorization", format!("Bearer {token}")))
}

#[rstest]
#[actix_web::test]
async fn driver_and_rider_complete_a_ride_then_rate_and_message() {
    let store = InMemoryStore::new();
    let state = web::Data::new(in_memory_http_state(
        &store,
        Arc::new(FixtureClock::fixed()),
    ));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(Trace)
            .configure(configure_api),
    )
    .await;

    let (status, driver) = send(
        &app,
        test::TestRequest::post().uri("/signup").set_json(json!({
            "email": "drew@example.com",
            "password": "secret1",
            "name": "Drew",
            "user_type": "driver"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let driver_token = text(&driver, "/access_token").to_owned();

    let (_, rider) = send(
        &app,
        test::TestRequest::post().uri("/signup").set_json(json!({
            "email": "rae@example.com",
            "password": "secret1",
            "user_type": "rider"
        })),
    )
    .await;
    let rider_token = text(&rider, "/access_token").to_owned();

    let (_, login) = send(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "drew@example.com", "password": "secret1" })),
    )
    .await;
    let driver_id = text(&login, "/user/id").to_owned();
    let (_, rider_profile) = send(
        &app,
        authed(test::TestRequest::get().uri("/user/profile"), &rider_token),
    )
    .await;
    let rider_id = text(&rider_profile, "/user/id").to_owned();

    let (status, created) = send(
        &app,
        authed(test::TestRequest::post().uri("/rides"), &driver_token).set_json(json!({
            "pickup_location": "Central Station",
            "pickup_latitude": 52.379,
            "pickup_longitude": 4.900,
            "destination": "Schiphol Airport",
            "destination_latitude": 52.310,
            "destination_longitude": 4.768,
            "scheduled_time": "2025-06-02T08:00:00Z",
            "seats_available": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&created, "/ride/status"), "scheduled");
    let ride_id = text(&created, "/ride/id").to_owned();

    let (status, joined) = send(
        &app,
        authed(
            test::TestRequest::post().uri(&format!("/rides/{ride_id}/join")),
            &rider_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&joined, "/ride/rider_id"), rider_id);

    let (status, sent) = send(
        &app,
        authed(test::TestRequest::post().uri("/messages"), &rider_token).set_json(json!({
            "ride_id": ride_id,
            "receiver_id": driver_id,
            "content": "Waiting by the north entrance"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message_id = text(&sent, "/data/id").to_owned();

    let (status, _) = send(
        &app,
        authed(
            test::TestRequest::post().uri(&format!("/messages/{message_id}/read")),
            &rider_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, read) = send(
        &app,
        authed(
            test::TestRequest::post().uri(&format!("/messages/{message_id}/read")),
            &driver_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read.pointer("/data/is_read"), Some(&json!(true)));

    let (status, early) = send(
        &app,
        authed(test::TestRequest::post().uri("/ratings"), &rider_token).set_json(json!({
            "ride_id": ride_id,
            "rated_user_id": driver_id,
            "rating": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&early, "/code"), "invalid_state");

    for status_name in ["active", "completed"] {
        let (status, updated) = send(
            &app,
            authed(
                test::TestRequest::put().uri(&format!("/rides/{ride_id}/status")),
                &driver_token,
            )
            .set_json(json!({ "status": status_name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text(&updated, "/ride/status"), status_name);
    }

    let (status, rated) = send(
        &app,
        authed(test::TestRequest::post().uri("/ratings"), &rider_token).set_json(json!({
            "ride_id": ride_id,
            "rated_user_id": driver_id,
            "rating": 5,
            "comment": "  Smooth ride  "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&rated, "/rating/comment"), "Smooth ride");
    assert_eq!(store.ratings().len(), 1);

    let (_, thread) = send(
        &app,
        authed(
            test::TestRequest::get().uri(&format!("/rides/{ride_id}/messages")),
            &driver_token,
        ),
    )
    .await;
    let messages = thread
        .get("messages")
        .and_then(Value::as_array)
        .expect("messages array");
    assert_eq!(messages.len(), 1);
}
