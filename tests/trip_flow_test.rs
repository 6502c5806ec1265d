mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::{TestApp, SESSION_HEADER};

#[actix_rt::test]
#[serial]
async fn test_trip_requires_session_header() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/trip").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_end_date_is_derived_from_start_and_days() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::patch()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-dates"))
        .set_json(&json!({
            "destination": "Goa",
            "start_date": "2024-06-01",
            "number_of_days": 3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["end_date"], "2024-06-03");

    let req = test::TestRequest::get()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-dates"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["trip"]["destination"], "Goa");
    assert_eq!(body["trip"]["end_date"], "2024-06-03");
}

#[actix_rt::test]
#[serial]
async fn test_setting_end_date_recomputes_day_count() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::patch()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-end-date"))
        .set_json(&json!({
            "start_date": "2024-06-01",
            "number_of_days": 3
        }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::patch()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-end-date"))
        .set_json(&json!({ "end_date": "2024-06-07" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["number_of_days"], 7);
}

#[actix_rt::test]
#[serial]
async fn test_clear_trip_drops_all_session_state() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::patch()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-clear"))
        .set_json(&json!({ "destination": "Manali" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-clear"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-clear"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["trip"]["destination"], serde_json::Value::Null);
    assert_eq!(body["itinerary_generated"], false);
}

#[actix_rt::test]
#[serial]
async fn test_step_validation_enumerates_missing_fields() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trip/steps/2")
        .insert_header((SESSION_HEADER, "trip-steps"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let missing = body["missing"].as_array().unwrap();
    assert!(missing.contains(&json!("destination")));
    assert!(missing.contains(&json!("start_date")));

    let req = test::TestRequest::patch()
        .uri("/api/trip")
        .insert_header((SESSION_HEADER, "trip-steps"))
        .set_json(&json!({
            "destination": "Goa",
            "start_date": "2024-06-01",
            "number_of_days": 3
        }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/trip/steps/2")
        .insert_header((SESSION_HEADER, "trip-steps"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], true);
}

#[actix_rt::test]
#[serial]
async fn test_selection_progression_guard() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    // Five places but no hotel: blocked.
    let req = test::TestRequest::put()
        .uri("/api/trip/selections")
        .insert_header((SESSION_HEADER, "trip-selections"))
        .set_json(&json!({
            "places": ["a", "b", "c", "d", "e"],
            "hotel": null
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["can_proceed_to_itinerary"], false);

    // Hotel plus four places: allowed.
    let req = test::TestRequest::put()
        .uri("/api/trip/selections")
        .insert_header((SESSION_HEADER, "trip-selections"))
        .set_json(&json!({
            "places": ["a", "b", "c", "d"],
            "hotel": "Hotel Sunrise"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["can_proceed_to_itinerary"], true);

    // Hotel plus three places: blocked again.
    let req = test::TestRequest::put()
        .uri("/api/trip/selections")
        .insert_header((SESSION_HEADER, "trip-selections"))
        .set_json(&json!({
            "places": ["a", "b", "c"],
            "hotel": "Hotel Sunrise"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["can_proceed_to_itinerary"], false);
}
