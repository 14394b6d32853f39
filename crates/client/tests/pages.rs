use axum::{
    Json, Router,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use chrono::{FixedOffset, NaiveDate};
use client::{
    ApiClient,
    error::{INVALID_CREDENTIALS_MESSAGE, SERVER_ERROR_MESSAGE},
    pages::{
        admin::reservations::{AdminReservationsPage, DecisionKind},
        create_reservation::CreateReservationPage,
        dashboard::DashboardPage,
        login::LoginPage,
        my_reservations::MyReservationsPage,
    },
    services::reservations,
    session::{Access, GuardDecision, Session},
    toast::ToastKind,
};
use models::{
    calendar::{CalendarView, MarkerTone},
    forms::{LoginField, ReservationField},
    reservation::{ReportQuery, ReservationStatus},
    stats::StatusFilter,
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::net::TcpListener;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn session(base_url: &str) -> Session {
    Session::new(
        ApiClient::new(base_url),
        FixedOffset::west_opt(5 * 3600).unwrap(),
    )
}

fn user_json(role: &str) -> Value {
    json!({
        "id": 2,
        "email": "teacher@fesc.local",
        "first_name": "Ana",
        "last_name": "Ruiz",
        "role": role,
        "is_active": true,
        "date_joined": "2024-01-01T00:00:00Z"
    })
}

fn reservation_json(id: i32, status: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Class {id}"),
        "description": "",
        "start_at": "2024-03-10T14:00:00Z",
        "end_at": "2024-03-10T15:00:00Z",
        "status": status,
        "space": {"id": 1, "name": "Módulo 3", "description": "", "location": "", "is_active": true},
        "created_by": {"id": 2, "email": "teacher@fesc.local", "first_name": "Ana", "last_name": "Ruiz"},
        "approved_by": null,
        "decision_at": null,
        "decision_note": ""
    })
}

fn tokens() -> Json<Value> {
    Json(json!({"access": "access-1", "refresh": "refresh-1"}))
}

#[tokio::test]
async fn test_login_stores_tokens_and_loads_user() {
    let router = Router::new()
        .route("/api/auth/login/", post(|| async { tokens() }))
        .route(
            "/api/auth/me/",
            get(|headers: HeaderMap| async move {
                match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                    Some("Bearer access-1") => Ok(Json(user_json("TEACHER"))),
                    _ => Err(StatusCode::UNAUTHORIZED),
                }
            }),
        );
    let mut session = session(&serve(router).await);

    let mut page = LoginPage::new();
    page.form.edit(LoginField::Email, "teacher@fesc.local");
    page.form.edit(LoginField::Password, "secret");

    let user = page.submit(&mut session).await.unwrap();
    assert_eq!(user.display_name(), "Ana Ruiz");
    assert_eq!(session.api.tokens().refresh().as_deref(), Some("refresh-1"));
    assert_eq!(session.guard(Access::Authenticated), GuardDecision::Allowed);
    assert_eq!(session.guard(Access::AdminOnly), GuardDecision::RedirectHome);
    assert_eq!(session.toasts.last().map(|t| t.kind), Some(ToastKind::Success));
}

#[tokio::test]
async fn test_rejected_login_clears_both_fields() {
    let router = Router::new().route(
        "/api/auth/login/",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "No active account found with the given credentials"})),
            )
        }),
    );
    let mut session = session(&serve(router).await);

    let mut page = LoginPage::new();
    page.form.edit(LoginField::Email, "teacher@fesc.local");
    page.form.edit(LoginField::Password, "wrong");

    assert!(page.submit(&mut session).await.is_none());
    assert_eq!(page.form.values().email, "");
    assert_eq!(page.form.values().password, "");
    assert_eq!(page.form.banner(), None);
    assert_eq!(
        session.toasts.last().map(|t| t.message.as_str()),
        Some(INVALID_CREDENTIALS_MESSAGE)
    );
    assert!(session.user.is_none());
}

#[tokio::test]
async fn test_invalid_login_form_sends_nothing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/auth/login/",
        post(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { tokens() }
        }),
    );
    let mut session = session(&serve(router).await);

    let mut page = LoginPage::new();
    page.form.edit(LoginField::Email, "not-an-email");

    assert!(page.submit(&mut session).await.is_none());
    assert_eq!(
        page.form.failing_fields(),
        vec![LoginField::Email, LoginField::Password]
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

fn fill(page: &mut CreateReservationPage, start: &str, end: &str) {
    page.form.edit(ReservationField::Space, "1");
    page.form.edit(ReservationField::Title, "Physics lab");
    page.form.edit(ReservationField::StartAt, start);
    page.form.edit(ReservationField::EndAt, end);
}

#[tokio::test]
async fn test_duration_guard_runs_before_the_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/reservations/",
        post(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { (StatusCode::CREATED, Json(reservation_json(1, "PENDING"))) }
        }),
    );
    let mut session = session(&serve(router).await);

    let mut page = CreateReservationPage::new(&session);
    fill(&mut page, "2024-03-10T09:00", "2024-03-10T09:20");

    assert!(page.submit(&mut session).await.is_none());
    assert_eq!(
        page.form.banner(),
        Some("Reservations must last at least 30 minutes")
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_server_rejection_lands_in_the_banner() {
    let router = Router::new().route(
        "/api/reservations/",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": "A reservation already exists in that time range"})),
            )
        }),
    );
    let mut session = session(&serve(router).await);

    let mut page = CreateReservationPage::new(&session);
    fill(&mut page, "2024-03-10T09:00", "2024-03-10T10:00");

    assert!(page.submit(&mut session).await.is_none());
    assert_eq!(
        page.form.banner(),
        Some("A reservation already exists in that time range")
    );
    assert_eq!(page.form.values().title, "Physics lab");
    assert!(session.toasts.is_empty());
}

#[tokio::test]
async fn test_created_reservation_sends_utc_instants() {
    let seen = Arc::new(Mutex::new(None));
    let store = seen.clone();
    let router = Router::new().route(
        "/api/reservations/",
        post(move |Json(body): Json<Value>| {
            *store.lock().unwrap() = Some(body);
            async { (StatusCode::CREATED, Json(reservation_json(9, "PENDING"))) }
        }),
    );
    let mut session = session(&serve(router).await);

    let mut page = CreateReservationPage::new(&session);
    fill(&mut page, "2024-03-10T09:00", "2024-03-10T10:00");

    let created = page.submit(&mut session).await.unwrap();
    assert_eq!(created.id, 9);
    assert_eq!(page.form.values().title, "");

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body["start_at"], "2024-03-10T14:00:00Z");
    assert_eq!(body["end_at"], "2024-03-10T15:00:00Z");
    assert_eq!(body["space_id"], 1);
}

#[tokio::test]
async fn test_load_picks_the_first_active_space_and_its_reservations() {
    let seen = Arc::new(Mutex::new(None));
    let store = seen.clone();
    let router = Router::new()
        .route(
            "/api/spaces/",
            get(|| async {
                Json(json!([
                    {"id": 1, "name": "Closed room", "is_active": false},
                    {"id": 2, "name": "Módulo 3", "is_active": true}
                ]))
            }),
        )
        .route(
            "/api/reservations/",
            get(move |Query(params): Query<HashMap<String, String>>| {
                *store.lock().unwrap() = Some(params);
                async { Json(json!([reservation_json(1, "PENDING")])) }
            }),
        );
    let mut session = session(&serve(router).await);

    let march = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let mut page = CreateReservationPage::new(&session);
    page.calendar = CalendarView::new(march, march);
    page.load(&mut session).await;

    assert_eq!(page.spaces.len(), 1);
    assert_eq!(page.form.values().space_id(), Some(2));

    let params = seen.lock().unwrap().clone().unwrap();
    assert_eq!(params.get("space_id").map(String::as_str), Some("2"));
    assert!(params.contains_key("start"));
    assert!(params.contains_key("end"));

    let grid = page.grid(&session);
    let tenth = grid.cell(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()).unwrap();
    assert_eq!(tenth.tones(), vec![MarkerTone::Pending]);
}

#[tokio::test]
async fn test_chosen_space_survives_load() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let store = seen.clone();
    let router = Router::new()
        .route(
            "/api/spaces/",
            get(|| async {
                Json(json!([
                    {"id": 2, "name": "Módulo 3", "is_active": true},
                    {"id": 4, "name": "Lab", "is_active": true}
                ]))
            }),
        )
        .route(
            "/api/reservations/",
            get(move |Query(params): Query<HashMap<String, String>>| {
                store.lock().unwrap().push(params);
                async { Json(json!([])) }
            }),
        );
    let mut session = session(&serve(router).await);

    let mut page = CreateReservationPage::new(&session);
    page.form.edit(ReservationField::Space, "4");
    page.load(&mut session).await;

    assert_eq!(page.form.values().space_id(), Some(4));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_shows_a_toast() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut session = session(&format!("http://{addr}/api"));

    let mut page = MyReservationsPage::new();
    page.load(&mut session).await;

    assert_eq!(page.banner, None);
    assert_eq!(
        session.toasts.last().map(|t| t.message.as_str()),
        Some(SERVER_ERROR_MESSAGE)
    );
}

#[tokio::test]
async fn test_cancel_is_only_sent_for_live_reservations() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let counter = cancelled.clone();
    let router = Router::new()
        .route(
            "/api/reservations/mine/",
            get(|| async {
                Json(json!([
                    reservation_json(1, "PENDING"),
                    reservation_json(2, "REJECTED"),
                    reservation_json(3, "APPROVED")
                ]))
            }),
        )
        .route(
            "/api/reservations/{id}/cancel/",
            post(move |body: Bytes| {
                assert!(body.is_empty());
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(reservation_json(1, "CANCELLED")) }
            }),
        );
    let mut session = session(&serve(router).await);

    let mut page = MyReservationsPage::new();
    page.load(&mut session).await;
    assert_eq!(page.counts().total, 3);

    page.set_filter(StatusFilter::Only(ReservationStatus::Approved));
    assert_eq!(page.visible().len(), 1);

    assert!(!page.cancel(&mut session, 2).await);
    assert_eq!(cancelled.load(Ordering::SeqCst), 0);

    assert!(page.cancel(&mut session, 1).await);
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_admin_decision_sends_the_note() {
    let seen = Arc::new(Mutex::new(None));
    let store = seen.clone();
    let router = Router::new()
        .route(
            "/api/reservations/",
            get(|| async {
                Json(json!([
                    reservation_json(1, "PENDING"),
                    reservation_json(2, "APPROVED")
                ]))
            }),
        )
        .route(
            "/api/reservations/{id}/reject/",
            post(move |body: Bytes| {
                *store.lock().unwrap() = Some(body);
                async { Json(reservation_json(1, "REJECTED")) }
            }),
        );
    let mut session = session(&serve(router).await);

    let mut page = AdminReservationsPage::new();
    page.load(&mut session).await;
    assert_eq!(page.visible().len(), 1);

    assert!(!page.open_decision(2, DecisionKind::Reject));
    assert!(page.open_decision(1, DecisionKind::Reject));
    page.set_note("  Room closed  ");

    assert!(page.confirm(&mut session).await);
    assert!(page.decision.is_none());

    let body = seen.lock().unwrap().clone().unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["note"], "Room closed");
}

#[tokio::test]
async fn test_dashboard_loads_own_reservations_for_teachers() {
    let router = Router::new().route(
        "/api/reservations/mine/",
        get(|| async {
            Json(json!([
                reservation_json(1, "PENDING"),
                reservation_json(2, "APPROVED")
            ]))
        }),
    );
    let mut session = session(&serve(router).await);

    let mut page = DashboardPage::new();
    page.load(&mut session, chrono::Utc::now()).await;

    let stats = page.stats.unwrap();
    assert_eq!(stats.total_month, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.next_approved.map(|r| r.id), Some(2));
    assert!(page.error.is_none());
}

#[tokio::test]
async fn test_report_download_returns_the_pdf_bytes() {
    let router = Router::new().route(
        "/api/reservations/report/",
        get(|| async { ([("content-type", "application/pdf")], "%PDF-1.4\n%%EOF") }),
    );
    let session = session(&serve(router).await);

    let bytes = reservations::download_report(&session.api, &ReportQuery::default())
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
