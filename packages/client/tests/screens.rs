//! Screen controllers against a mock server

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use defects_client::screens::{
    ActionOutcome, AnalyticsScreen, BuildingsScreen, DashboardScreen, DefectDetailScreen,
    DefectFormScreen, DefectListScreen, UsersScreen,
};
use defects_client::{ApiClient, ClientConfig, ClientError, SessionStore, StoredSession};
use defects_core::{
    ActionInput, BuildingInput, CommentField, DefectAction, DefectCreate, DefectStatus, Priority,
    Role, StatusFilter, TransitionPolicy, User, UserInput,
};
use defects_media::{ImageUpload, PhotoRef};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn user(id: i64, role: Role) -> User {
    User {
        id,
        name: format!("User {}", id),
        email: format!("user{}@example.com", id),
        role,
        created_at: None,
        updated_at: None,
    }
}

async fn client_as(server: &MockServer, dir: &TempDir, who: User) -> ApiClient {
    let session_path = dir.path().join("session.toml");
    SessionStore::new(&session_path)
        .save(&StoredSession::new("jwt", None, who))
        .await
        .unwrap();
    ApiClient::connect(
        ClientConfig::new(format!("{}/api", server.uri())).with_session_path(session_path),
    )
    .await
    .unwrap()
}

fn defect_json(id: i64, status: &str, assigned: Option<i64>) -> Value {
    json!({
        "id": id,
        "title": format!("Defect {}", id),
        "description": "Water on floor",
        "status": status,
        "priority": "medium",
        "building_id": 3,
        "assigned_technician_id": assigned,
        "created_at": "2024-05-01T09:00:00",
        "updated_at": format!("2024-05-{:02}T09:00:00", id),
    })
}

async fn mount_get(server: &MockServer, at: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_screen_filters_and_pages_locally() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let defects: Vec<Value> = (1..=12)
        .map(|id| defect_json(id, if id % 2 == 0 { "Open" } else { "Done" }, None))
        .collect();
    mount_get(&server, "/api/defects", Value::Array(defects)).await;
    mount_get(&server, "/api/buildings", json!([{"id": 3, "name": "North Tower"}])).await;
    Mock::given(method("GET"))
        .and(path("/api/users/technicians"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(1, Role::Admin)).await;
    let mut screen = DefectListScreen::load(&client, 5).await.unwrap();

    assert!(screen.technicians().is_empty());
    assert_eq!(screen.building_name(Some(3)), Some("North Tower"));

    let page = screen.page();
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.meta.total_pages, 3);
    // newest update first by default
    assert_eq!(page.rows[0].id, 12);

    screen.state_mut().page_mut().goto(3);
    screen.state_mut().set_status(StatusFilter::Only(defects_core::DefectStatus::Open));
    let page = screen.page();
    assert_eq!(page.meta.page, 1);
    assert_eq!(page.meta.total_items, 6);
    assert!(page.rows.iter().all(|d| d.id % 2 == 0));
}

#[tokio::test]
async fn test_list_screen_reports_server_message() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/defects"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_get(&server, "/api/buildings", json!([])).await;

    let client = client_as(&server, &dir, user(1, Role::Csr)).await;
    let err = DefectListScreen::load(&client, 10).await.err().unwrap();
    assert_eq!(err.to_string(), "Failed to load defects");
}

#[tokio::test]
async fn test_detail_degrades_when_secondary_fetches_fail() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/defects/4", defect_json(4, "Reviewed", Some(9))).await;
    Mock::given(method("GET"))
        .and(path("/api/defects/4/comments"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/buildings/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_get(&server, "/api/users/9", json!({"id": 9, "name": "Sam", "email": "sam@example.com", "role": "technician"})).await;

    let client = client_as(&server, &dir, user(2, Role::Csr)).await;
    let screen = DefectDetailScreen::load(&client, 4, TransitionPolicy::RoleOnly)
        .await
        .unwrap();

    assert_eq!(screen.defect.id, 4);
    assert!(screen.comments.is_empty());
    assert!(screen.building.is_none());
    assert_eq!(screen.assignee.as_ref().map(|u| u.name.as_str()), Some("Sam"));
    assert_eq!(screen.editable_tabs(), vec![CommentField::InitialReport]);
}

#[tokio::test]
async fn test_done_without_photo_never_reaches_server() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/defects/5", defect_json(5, "Ongoing", Some(9))).await;
    mount_get(&server, "/api/defects/5/comments", json!([])).await;
    mount_get(&server, "/api/buildings/3", json!({"id": 3, "name": "North Tower"})).await;
    mount_get(&server, "/api/users/9", json!({"id": 9, "name": "Sam", "email": "sam@example.com", "role": "technician"})).await;
    Mock::given(method("PATCH"))
        .and(path("/api/defects/5/done"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(9, Role::Technician)).await;
    let mut screen = DefectDetailScreen::load(&client, 5, TransitionPolicy::RoleOnly)
        .await
        .unwrap();

    let err = screen
        .perform(DefectAction::Done, ActionInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Failed to done defect"), "Completed job photo is required.");
}

#[tokio::test]
async fn test_assign_sends_technician_and_reloads() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/defects/6", defect_json(6, "Reviewed", None)).await;
    mount_get(&server, "/api/defects/6/comments", json!([{"executive_decision": "Fix it"}])).await;
    mount_get(&server, "/api/buildings/3", json!({"id": 3, "name": "North Tower"})).await;
    mount_get(&server, "/api/users/technicians", json!([{"id": 9, "name": "Sam", "email": "sam@example.com", "role": "technician"}])).await;
    mount_get(&server, "/api/users/9", json!({"id": 9, "name": "Sam", "email": "sam@example.com", "role": "technician"})).await;
    Mock::given(method("PATCH"))
        .and(path("/api/defects/6/assign"))
        .and(body_json(json!({"assigned_technician_id": 9})))
        .respond_with(ResponseTemplate::new(200).set_body_json(defect_json(6, "Ongoing", Some(9))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(2, Role::BuildingExecutive)).await;
    let mut screen = DefectDetailScreen::load(&client, 6, TransitionPolicy::RoleOnly)
        .await
        .unwrap();
    assert_eq!(screen.technicians.len(), 1);
    assert_eq!(screen.comments.get(CommentField::ExecutiveDecision), Some("Fix it"));

    let outcome = screen
        .perform(
            DefectAction::Assign,
            ActionInput {
                technician_id: Some(9),
                ..ActionInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Updated);
}

#[tokio::test]
async fn test_comment_save_rejects_blank_and_foreign_tabs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/defects/7", defect_json(7, "Open", None)).await;
    mount_get(&server, "/api/defects/7/comments", json!([])).await;
    mount_get(&server, "/api/buildings/3", json!({"id": 3, "name": "North Tower"})).await;
    Mock::given(method("PATCH"))
        .and(path("/api/defects/7/comments"))
        .and(body_json(json!({"initial_report": "Ceiling tile cracked"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "defect_id": 7, "initial_report": "Ceiling tile cracked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(2, Role::Csr)).await;
    let mut screen = DefectDetailScreen::load(&client, 7, TransitionPolicy::RoleOnly)
        .await
        .unwrap();

    let err = screen
        .save_comment(CommentField::InitialReport, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Comment cannot be empty.");

    let err = screen
        .save_comment(CommentField::TechnicianReport, "done")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));

    screen
        .save_comment(CommentField::InitialReport, "  Ceiling tile cracked ")
        .await
        .unwrap();
    assert_eq!(
        screen.comments.get(CommentField::InitialReport),
        Some("Ceiling tile cracked")
    );
}

#[tokio::test]
async fn test_unchanged_contractor_name_is_not_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut defect = defect_json(8, "Reviewed", None);
    defect["contractor_name"] = json!("Acme Plumbing");
    mount_get(&server, "/api/defects/8", defect).await;
    mount_get(&server, "/api/defects/8/comments", json!([])).await;
    mount_get(&server, "/api/buildings/3", json!({"id": 3, "name": "North Tower"})).await;
    mount_get(&server, "/api/users/technicians", json!([])).await;
    Mock::given(method("PUT"))
        .and(path("/api/defects/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(1, Role::Admin)).await;
    let mut screen = DefectDetailScreen::load(&client, 8, TransitionPolicy::RoleOnly)
        .await
        .unwrap();
    assert!(!screen.save_contractor_name(" Acme Plumbing ").await.unwrap());
}

#[tokio::test]
async fn test_form_validation_blocks_submit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/buildings", json!([{"id": 3, "name": "North Tower"}])).await;
    Mock::given(method("POST"))
        .and(path("/api/defects"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(2, Role::Csr)).await;
    let screen = DefectFormScreen::load(&client).await.unwrap();
    assert_eq!(screen.buildings.len(), 1);

    let form = DefectCreate {
        title: "Broken window".into(),
        ..DefectFormScreen::blank()
    };
    let err = screen.submit(form).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_technicians_cannot_open_form() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = client_as(&server, &dir, user(9, Role::Technician)).await;

    let err = DefectFormScreen::load(&client).await.err().unwrap();
    assert_eq!(err.to_string(), "You don't have permission to access this page.");
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/users", json!([{"id": 1, "name": "Admin", "email": "admin@example.com", "role": "admin"}])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(1, Role::Admin)).await;
    let mut screen = UsersScreen::load(&client).await.unwrap();
    let err = screen.delete(1).await.unwrap_err();
    assert_eq!(err.to_string(), "You cannot delete your own account");
}

#[tokio::test]
async fn test_list_screen_skips_roster_for_unprivileged_roles() {
    for role in [Role::Technician, Role::Csr] {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_get(&server, "/api/defects", json!([defect_json(1, "Open", None)])).await;
        mount_get(&server, "/api/buildings", json!([])).await;
        Mock::given(method("GET"))
            .and(path("/api/users/technicians"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_as(&server, &dir, user(9, role)).await;
        let screen = DefectListScreen::load(&client, 10).await.unwrap();
        assert_eq!(screen.defects().len(), 1);
        assert!(screen.technicians().is_empty());
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 90, 160]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[tokio::test]
async fn test_form_submits_scaled_photo() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(&server, "/api/buildings", json!([{"id": 3, "name": "North Tower"}])).await;
    Mock::given(method("POST"))
        .and(path("/api/defects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(defect_json(20, "Open", None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(2, Role::Csr)).await;
    let screen = DefectFormScreen::load(&client).await.unwrap();

    let upload = ImageUpload::from_bytes("leak.png", png(2000, 1000)).unwrap();
    let form = DefectCreate {
        title: "Leaking pipe".into(),
        description: "Water under the sink".into(),
        building_id: Some(3),
        priority: Some(Priority::High),
        ..DefectFormScreen::blank()
    };
    let form = DefectFormScreen::attach_photo(form, &upload).unwrap();
    let created = screen.submit(form).await.unwrap();
    assert_eq!(created.id, 20);

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/api/defects")
        .unwrap();
    let body: Value = serde_json::from_slice(&post.body).unwrap();

    let photo = body["initial_report_image"].as_str().unwrap();
    assert!(photo.starts_with("data:image/jpeg;base64,"));
    assert_eq!(body["image_url"].as_str(), Some(photo));
    assert_eq!(body["priority"], json!("high"));

    let decoded = PhotoRef::parse(photo).unwrap();
    assert_eq!(decoded.dimensions().unwrap(), Some((1280, 640)));
}

#[tokio::test]
async fn test_buildings_screen_save_and_delete() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(
        &server,
        "/api/buildings",
        json!([{"id": 3, "name": "North Tower", "address": "1 Harbour Rd"}]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/buildings"))
        .and(body_json(json!({"name": "Annex", "address": "2 Harbour Rd"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 4, "name": "Annex", "address": "2 Harbour Rd"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/buildings/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/buildings/8"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Building already exists"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/buildings/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Building deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(1, Role::Admin)).await;
    let mut screen = BuildingsScreen::load(&client).await.unwrap();
    assert_eq!(screen.buildings.len(), 1);

    let err = screen
        .save(None, BuildingInput { name: " ".into(), address: String::new() })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Building name is required; Address is required");

    let saved = screen
        .save(
            None,
            BuildingInput {
                name: "  Annex ".into(),
                address: "2 Harbour Rd ".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.id, 4);

    let edit = BuildingInput {
        name: "North Tower".into(),
        address: "1 Harbour Rd".into(),
    };
    let err = screen.save(Some(3), edit.clone()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to save building.");
    let err = screen.save(Some(8), edit).await.unwrap_err();
    assert_eq!(err.to_string(), "Building already exists");

    screen.delete(3).await.unwrap();
    assert!(screen.buildings.iter().all(|b| b.id != 3));
}

#[tokio::test]
async fn test_user_edit_omits_blank_password() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(
        &server,
        "/api/users",
        json!([{"id": 4, "name": "Sam", "email": "sam@example.com", "role": "technician"}]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/4"))
        .and(body_json(json!({
            "name": "Sam Reid",
            "email": "sam@example.com",
            "role": "technician"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "name": "Sam Reid", "email": "sam@example.com", "role": "technician"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(1, Role::Admin)).await;
    let mut screen = UsersScreen::load(&client).await.unwrap();
    let saved = screen
        .save(
            Some(4),
            UserInput {
                name: "Sam Reid".into(),
                email: "sam@example.com".into(),
                role: Role::Technician,
                password: Some("   ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.name, "Sam Reid");
}

#[tokio::test]
async fn test_analytics_counts_from_defect_list() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(
        &server,
        "/api/defects",
        json!([
            defect_json(1, "Open", None),
            defect_json(2, "Completed", Some(9)),
            defect_json(3, "Completed", Some(9)),
            defect_json(4, "Ongoing", Some(9)),
        ]),
    )
    .await;
    mount_get(
        &server,
        "/api/analytics/defects-per-building",
        json!([{"building_id": 3, "building_name": "North Tower", "defect_count": 4}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/defects-status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_as(&server, &dir, user(1, Role::Admin)).await;
    let screen = AnalyticsScreen::load(&client).await.unwrap();

    assert_eq!(screen.summary.total, 4);
    assert_eq!(screen.summary.count(DefectStatus::Completed), 2);
    assert_eq!(screen.summary.completion_rate, 50);
    assert_eq!(screen.per_building.len(), 1);
    assert!(screen.server_status_counts.is_empty());
}

#[tokio::test]
async fn test_analytics_is_admin_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = client_as(&server, &dir, user(2, Role::BuildingExecutive)).await;

    let err = AnalyticsScreen::load(&client).await.err().unwrap();
    assert_eq!(err.to_string(), "You don't have permission to access this page.");
}

#[tokio::test]
async fn test_dashboard_stats_and_load_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_get(
        &server,
        "/api/defects",
        json!([
            defect_json(1, "Open", None),
            defect_json(2, "Open", None),
            defect_json(3, "Ongoing", Some(9)),
        ]),
    )
    .await;

    let client = client_as(&server, &dir, user(9, Role::Technician)).await;
    let screen = DashboardScreen::load(&client).await.unwrap();
    assert_eq!(screen.stats.total, 3);
    assert_eq!(screen.stats.open, 2);
    assert_eq!(screen.stats.ongoing, 1);
    assert_eq!(screen.stats.completed, 0);
    assert_eq!(screen.stats.recent[0].id, 3);

    let failing = MockServer::start().await;
    let failing_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/defects"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;
    let client = client_as(&failing, &failing_dir, user(9, Role::Technician)).await;
    let err = DashboardScreen::load(&client).await.err().unwrap();
    assert_eq!(err.to_string(), "Failed to load dashboard data.");
}
