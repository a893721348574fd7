mod common;

use std::time::Instant;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parcelpoint_admin::errors::{AdminError, GENERIC_FAILURE_MESSAGE};
use parcelpoint_admin::models::{NewPackage, PackageUpdate, ServiceRequestStatus};
use parcelpoint_admin::uploads::{UploadFile, MAX_UPLOAD_BYTES};
use parcelpoint_admin::workflow::{LoadState, PackageAdminView};

use common::{package_json, package_with_requests_json, service_request_json, test_client, ADMIN_PREFIX};

async fn mount_package_list(server: &MockServer, user: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{}/packages/", ADMIN_PREFIX)))
        .and(query_param("user", user))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn list_and_detail_agree_after_a_mutation() {
    let server = MockServer::start().await;
    mount_package_list(
        &server,
        "7",
        json!([
            package_json(42, "in_warehouse", "Shelf A3"),
            package_json(43, "in_warehouse", "Shelf B1"),
        ]),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/packages/42/", ADMIN_PREFIX)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(package_json(42, "ready_to_ship", "Bin 12")),
        )
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    assert_eq!(view.load_state(), LoadState::Loaded);
    assert!(view.select_package(42));

    let update = PackageUpdate {
        status: Some("ready_to_ship".into()),
        location: Some("Bin 12".into()),
        ..Default::default()
    };
    view.update_package(42, &update).await.unwrap();

    // List copy and detail copy are the same record.
    let detail = view.selected_package().unwrap();
    let listed = view.packages().into_iter().find(|p| p.id == 42).unwrap();
    assert_eq!(detail, listed);
    assert_eq!(detail.status, "ready_to_ship");
    assert_eq!(detail.location.as_deref(), Some("Bin 12"));

    // The sibling package is untouched.
    let other = view.packages().into_iter().find(|p| p.id == 43).unwrap();
    assert_eq!(other.status, "in_warehouse");

    // Success posts a transient notice and clears when expired.
    assert_eq!(view.notice_at(Instant::now()), Some("Package updated"));
    assert_eq!(view.error(), None);
}

#[tokio::test]
async fn disallowed_file_type_fails_with_zero_network_calls() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_json(42, "in_warehouse", "")])).await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    let before = view.packages();
    let pdf = UploadFile::new("invoice.pdf", "application/pdf", vec![0u8; 32]);
    let err = view.upload_image(42, &pdf).await.unwrap_err();
    assert_matches!(err, AdminError::Validation(_));

    assert!(view.error().unwrap().contains("not allowed"));
    assert_eq!(view.packages(), before);
    // Only the initial list fetch reached the server.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn oversize_file_fails_with_zero_network_calls() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_json(42, "in_warehouse", "")])).await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    let oversize = UploadFile::new("big.png", "image/png", vec![0u8; MAX_UPLOAD_BYTES + 1]);
    let err = view.upload_image(42, &oversize).await.unwrap_err();
    assert_matches!(err, AdminError::Validation(_));

    assert!(view.error().unwrap().contains("too large"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_update_leaves_list_and_detail_unchanged() {
    let server = MockServer::start().await;
    mount_package_list(
        &server,
        "7",
        json!([package_json(42, "in_warehouse", "Shelf A3")]),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/packages/42/", ADMIN_PREFIX)))
        .respond_with(ResponseTemplate::new(500).set_body_string("database exploded"))
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    view.select_package(42);

    let packages_before = view.packages();
    let detail_before = view.selected_package();

    let update = PackageUpdate {
        status: Some("shipped".into()),
        ..Default::default()
    };
    let err = view.update_package(42, &update).await.unwrap_err();
    assert_matches!(err, AdminError::Api { .. });

    // Fails closed: no state mutated, generic banner shown.
    assert_eq!(view.packages(), packages_before);
    assert_eq!(view.selected_package(), detail_before);
    assert_eq!(view.error(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(view.notice_at(Instant::now()), None);
}

#[tokio::test]
async fn start_processing_advances_only_the_matching_request() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_with_requests_json(42)])).await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/service-requests/9/", ADMIN_PREFIX)))
        .and(body_json(json!({ "status": "in_progress" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(service_request_json(9, "in_progress")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    view.select_package(42);

    view.start_processing(9).await.unwrap();

    let detail = view.selected_package().unwrap();
    assert_eq!(detail.service_request(9).unwrap().status, "in_progress");
    assert_eq!(detail.service_request(10).unwrap().status, "pending");

    // The enclosing package stays consistent in the list view too.
    let listed = view.packages().into_iter().find(|p| p.id == 42).unwrap();
    assert_eq!(listed, detail);
}

#[tokio::test]
async fn failed_transition_mutates_nothing() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_with_requests_json(42)])).await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/service-requests/9/", ADMIN_PREFIX)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    view.select_package(42);
    let before = view.selected_package();

    let err = view.start_processing(9).await.unwrap_err();
    assert_matches!(err, AdminError::Api { .. });
    assert_eq!(view.selected_package(), before);
    assert_eq!(view.error(), Some(GENERIC_FAILURE_MESSAGE));
    assert!(!view.is_request_busy(9));
}

#[tokio::test]
async fn a_request_with_a_transition_in_flight_rejects_a_second_one() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_with_requests_json(42)])).await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    let ticket = view
        .begin_transition(9, ServiceRequestStatus::InProgress)
        .unwrap();
    assert!(view.is_request_busy(9));
    assert!(!view.is_request_busy(10));

    // The busy request rejects a second transition while it is in flight.
    let err = view
        .begin_transition(9, ServiceRequestStatus::InProgress)
        .unwrap_err();
    assert_matches!(err, AdminError::Validation(_));

    // Its sibling stays interactive.
    let sibling = view
        .begin_transition(10, ServiceRequestStatus::InProgress)
        .unwrap();

    let updated = serde_json::from_value(service_request_json(9, "in_progress")).unwrap();
    view.finish_transition(ticket, Ok(updated)).unwrap();
    assert!(!view.is_request_busy(9));
    assert!(view.is_request_busy(10));

    let pkg = view.packages().into_iter().find(|p| p.id == 42).unwrap();
    assert_eq!(pkg.service_request(9).unwrap().status, "in_progress");

    // A failed transition clears the busy flag too.
    let failure = AdminError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
    assert!(view.finish_transition(sibling, Err(failure)).is_err());
    assert!(!view.is_request_busy(10));
    assert_eq!(view.error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn only_forward_transitions_are_exposed() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_with_requests_json(42)])).await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    // A pending request cannot be marked complete directly.
    let err = view.mark_complete(9).await.unwrap_err();
    assert_matches!(err, AdminError::Validation(_));

    // An unknown request id is rejected before any call.
    let err = view.start_processing(999).await.unwrap_err();
    assert_matches!(err, AdminError::Validation(_));

    // Only the initial list fetch reached the server.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn not_found_renders_the_empty_state_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/packages/", ADMIN_PREFIX)))
        .and(query_param("user", "7"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "No packages" })),
        )
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    assert_eq!(view.load_state(), LoadState::Loaded);
    assert!(view.packages().is_empty());
    assert_eq!(view.error(), None);
}

#[tokio::test]
async fn transport_failures_set_the_failed_state_and_banner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/packages/", ADMIN_PREFIX)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    assert_eq!(view.load_state(), LoadState::Failed);
    assert_eq!(view.error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn load_is_a_noop_without_a_user() {
    let server = MockServer::start().await;
    let mut view = PackageAdminView::new(test_client(&server.uri()));

    view.load_packages(None).await;

    assert_eq!(view.load_state(), LoadState::Idle);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn created_package_is_prepended_and_selection_is_untouched() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_json(42, "in_warehouse", "")])).await;
    Mock::given(method("POST"))
        .and(path(format!("{}/packages/", ADMIN_PREFIX)))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(package_json(99, "in_warehouse", "Dock")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    view.select_package(42);

    let draft = NewPackage::new(7, 1, "F2362C", "Sahil Gholap");
    let created = view.create_package(&draft, None).await.unwrap();
    assert_eq!(created.id, 99);

    let ids: Vec<i64> = view.packages().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![99, 42]);
    assert_eq!(view.selected_package().unwrap().id, 42);

    // The multipart body carried the required fields and no image part.
    let requests = server.received_requests().await.unwrap();
    let create_request = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body = String::from_utf8_lossy(&create_request.body).into_owned();
    assert!(body.contains("name=\"user_suite\""));
    assert!(body.contains("F2362C"));
    assert!(body.contains("name=\"full_name\""));
    assert!(body.contains("Sahil Gholap"));
    assert!(body.contains("name=\"status\""));
    assert!(body.contains("in_warehouse"));
    assert!(!body.contains("name=\"image\""));
}

#[tokio::test]
async fn edit_dialog_strips_empty_fields_from_the_patch() {
    let server = MockServer::start().await;
    // Package 42 with no location set.
    let mut fixture = package_json(42, "in_warehouse", "");
    fixture["location"] = json!(null);
    mount_package_list(&server, "7", json!([fixture])).await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/packages/42/", ADMIN_PREFIX)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(package_json(42, "ready_to_ship", "")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    view.select_package(42);
    assert!(view.open_edit_dialog());

    // The admin changes the status but leaves location empty.
    view.edit_form_mut().unwrap().status = "ready_to_ship".into();
    view.submit_edit_dialog(None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.as_str() == "PATCH")
        .unwrap();
    let body = String::from_utf8_lossy(&patch.body).into_owned();
    assert!(body.contains("name=\"status\""));
    assert!(body.contains("ready_to_ship"));
    assert!(!body.contains("name=\"location\""));

    // Dialog closed on success.
    assert!(view.edit_form().is_none());
}

#[tokio::test]
async fn stale_load_results_are_discarded() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    let mut view = PackageAdminView::new(client);

    // A load starts, then the admin navigates away before it settles.
    let ticket = view.begin_load(Some(7)).unwrap();
    view.return_to_list();

    view.finish_load(ticket, Ok(vec![]));

    // The stale result did not overwrite the view state.
    assert_eq!(view.load_state(), LoadState::Loading);

    // A fresh load still applies normally.
    let ticket = view.begin_load(Some(7)).unwrap();
    view.finish_load(ticket, Ok(vec![]));
    assert_eq!(view.load_state(), LoadState::Loaded);
}

#[tokio::test]
async fn newer_load_supersedes_an_older_one() {
    let server = MockServer::start().await;
    let mut view = PackageAdminView::new(test_client(&server.uri()));

    let old = view.begin_load(Some(7)).unwrap();
    let new = view.begin_load(Some(8)).unwrap();

    // The older response arrives late and is dropped.
    view.finish_load(
        old,
        Ok(serde_json::from_value(json!([package_json(1, "in_warehouse", "")])).unwrap()),
    );
    assert_eq!(view.load_state(), LoadState::Loading);

    view.finish_load(
        new,
        Ok(serde_json::from_value(json!([package_json(2, "in_warehouse", "")])).unwrap()),
    );
    let ids: Vec<i64> = view.packages().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn status_vocabulary_fetch_failure_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/packages/statuses/", ADMIN_PREFIX)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/service-requests/statuses/", ADMIN_PREFIX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "value": "pending", "label": "Pending" }
        ])))
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_status_vocabularies().await;

    // Package vocabulary degraded to the hardcoded list, still usable.
    assert!(view.package_statuses().from_fallback);
    assert!(view.package_statuses().contains("in_warehouse"));

    // Service request vocabulary came from the backend.
    assert!(!view.service_request_statuses().from_fallback);
    assert_eq!(view.service_request_statuses().options.len(), 1);
}

#[tokio::test]
async fn returning_to_the_list_clears_detail_state() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_json(42, "in_warehouse", "")])).await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/packages/42/", ADMIN_PREFIX)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;
    view.select_package(42);
    view.open_edit_dialog();

    // Leave an error banner behind.
    let update = PackageUpdate {
        status: Some("shipped".into()),
        ..Default::default()
    };
    let _ = view.update_package(42, &update).await;
    assert!(view.error().is_some());

    view.return_to_list();
    assert!(view.selected_package().is_none());
    assert!(view.edit_form().is_none());
    assert!(view.error().is_none());
}

#[tokio::test]
async fn next_error_replaces_the_previous_banner() {
    let server = MockServer::start().await;
    mount_package_list(&server, "7", json!([package_json(42, "in_warehouse", "")])).await;

    let mut view = PackageAdminView::new(test_client(&server.uri()));
    view.load_packages(Some(7)).await;

    let pdf = UploadFile::new("a.pdf", "application/pdf", vec![0u8; 8]);
    let _ = view.upload_image(42, &pdf).await;
    let first = view.error().unwrap().to_string();

    let oversize = UploadFile::new("b.png", "image/png", vec![0u8; MAX_UPLOAD_BYTES + 1]);
    let _ = view.upload_image(42, &oversize).await;
    let second = view.error().unwrap().to_string();

    assert_ne!(first, second);
    assert!(second.contains("too large"));
}
