mod common;

use std::{
    sync::atomic::{AtomicU32, Ordering},
    sync::Arc,
    time::Duration,
};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use botdesk::{
    config::AdminConfig,
    db::{
        self, AccessCodeRepository, DutyRepository, MessageRepository, RoleRepository,
        UserRepository,
    },
    mailing::{MailingRegistry, MailingWorker},
    web::{self, WebState},
};

use common::MockTransport;

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

async fn setup() -> (Router, WebState, Arc<MockTransport>, CancellationToken) {
    let db_path = std::env::temp_dir().join(format!(
        "botdesk-test-{}-{}.db",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_file(&db_path);
    let pool = db::init_pool(&db_path).await.unwrap();

    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MailingRegistry::new());
    let cancel = CancellationToken::new();
    let (mailing_tx, worker) = MailingWorker::new(transport.clone());
    let _ = worker.spawn(cancel.clone());

    let state = WebState {
        admin: AdminConfig {
            login: "admin".to_string(),
            password: "secret".to_string(),
        },
        static_dir: std::env::temp_dir(),
        users: UserRepository::new(pool.clone()),
        messages: MessageRepository::new(pool.clone()),
        roles: RoleRepository::new(pool.clone()),
        duties: DutyRepository::new(pool.clone()),
        access_codes: AccessCodeRepository::new(pool.clone()),
        registry,
        mailing_tx,
        transport: transport.clone(),
    };

    (web::router(state.clone()), state, transport, cancel)
}

fn auth_header() -> String {
    format!("Basic {}", STANDARD.encode("admin:secret"))
}

fn get(uri: &str, authed: bool) -> Request<Body> {
    let mut builder = Request::get(uri);
    if authed {
        builder = builder.header(header::AUTHORIZATION, auth_header());
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, auth_header())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "XBOUNDARYX";

fn post_multipart(uri: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, auth_header())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn multipart_with_text(text: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n--{BOUNDARY}--\r\n"
    )
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn admin_surface_requires_basic_auth() {
    let (router, _state, _transport, _cancel) = setup().await;

    let response = router.clone().oneshot(get("/admin", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let bad = Request::get("/admin")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("admin:wrong")),
        )
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(bad).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router.clone().oneshot(get("/admin", true)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Public pages stay open.
    let response = router.oneshot(get("/", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn role_names_are_unique_and_delete_sweeps_access_codes() {
    let (router, state, _transport, _cancel) = setup().await;

    let response = router
        .clone()
        .oneshot(post_json("/add_role", r#"{"name":"manager","duties":[]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(post_json("/add_role", r#"{"name":"manager","duties":[]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let role = state.roles.get_by_name("manager").await.unwrap().unwrap();
    state.access_codes.add("code-1", role.id).await.unwrap();
    state.access_codes.add("code-2", role.id).await.unwrap();

    let response = router
        .clone()
        .oneshot(get(&format!("/delete_role/{}", role.id), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(state.roles.get(role.id).await.unwrap().is_none());
    assert!(state.access_codes.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_duty_sweeps_it_out_of_roles() {
    let (router, state, _transport, _cancel) = setup().await;

    let duty_json = r#"{
        "name": "packer",
        "about": "packs boxes",
        "question": "can you pack?",
        "correct_answer": "yes",
        "incorrect_answers": ["no", "maybe", "later"]
    }"#;
    let response = router
        .clone()
        .oneshot(post_json("/add_duty", duty_json))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let duty = state.duties.get_by_name("packer").await.unwrap().unwrap();
    let role_id = state.roles.add("worker", &[duty.id, 99]).await.unwrap();

    let response = router
        .clone()
        .oneshot(get(&format!("/delete_duty/{}", duty.id), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(state.duties.get(duty.id).await.unwrap().is_none());
    let role = state.roles.get(role_id).await.unwrap().unwrap();
    assert_eq!(role.duties, vec![99]);
}

#[tokio::test]
async fn access_codes_are_scoped_to_existing_roles() {
    let (router, state, _transport, _cancel) = setup().await;

    let response = router
        .clone()
        .oneshot(post_json("/add_access_code", r#"{"code":"alpha","role_id":42}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let role_id = state.roles.add("courier", &[]).await.unwrap();
    let other_id = state.roles.add("packer", &[]).await.unwrap();
    let response = router
        .clone()
        .oneshot(post_json(
            "/add_access_code",
            &format!(r#"{{"code":"alpha","role_id":{role_id}}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    state.access_codes.add("beta", other_id).await.unwrap();

    let response = router
        .clone()
        .oneshot(get(&format!("/role_access_codes/{role_id}"), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("alpha"));
    assert!(!body.contains("beta"));

    let code = &state.access_codes.by_role(role_id).await.unwrap()[0];
    let response = router
        .clone()
        .oneshot(get(&format!("/delete_access_code/{}", code.id), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.access_codes.by_role(role_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn mailing_runs_end_to_end_from_the_form() {
    let (router, state, transport, _cancel) = setup().await;

    state.users.upsert(10, Some("ada"), None, None).await.unwrap();
    state.users.upsert(20, Some("bob"), None, None).await.unwrap();

    let response = router
        .clone()
        .oneshot(post_multipart("/mailing", multipart_with_text("hello all")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let statuses = state.registry.statuses();
        if !statuses.is_empty() && statuses.iter().all(|s| !s.in_progress) {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "mailing never finished");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let statuses = state.registry.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].sent, 2);
    assert_eq!(statuses[0].failed, 0);
    assert_eq!(transport.calls().len(), 2);

    let response = router
        .clone()
        .oneshot(get("/mailing_status", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(&statuses[0].id));
}

#[tokio::test]
async fn empty_mailing_form_is_rejected_without_creating_a_job() {
    let (router, state, _transport, _cancel) = setup().await;

    let response = router
        .clone()
        .oneshot(post_multipart("/mailing", format!("--{BOUNDARY}--\r\n")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.registry.statuses().is_empty());
}
