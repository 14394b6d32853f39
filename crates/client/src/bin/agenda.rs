use anyhow::{Context, Result, bail};
use chrono::{FixedOffset, NaiveDate};
use client::{
    ApiClient,
    pages::{calendar::CalendarPage, login::LoginPage},
    session::Session,
};
use log::info;
use models::{
    calendar::CalendarView,
    datetime::{format_date, format_time},
    forms::LoginField,
};
use std::env;

const DEFAULT_UTC_OFFSET_MINUTES: i32 = -300;

fn utc_offset() -> Result<FixedOffset> {
    let minutes = match env::var("UTC_OFFSET_MINUTES") {
        Ok(raw) => raw
            .trim()
            .parse::<i32>()
            .with_context(|| format!("UTC_OFFSET_MINUTES is not a number: {raw}"))?,
        Err(_) => DEFAULT_UTC_OFFSET_MINUTES,
    };
    FixedOffset::east_opt(minutes * 60).context("UTC_OFFSET_MINUTES is out of range")
}

/// Prints one month of reservations: `agenda [YYYY-MM]`
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let tz = utc_offset()?;
    let mut session = Session::new(ApiClient::from_env(), tz);
    info!("Using API at {}", session.api.base_url());

    let (Ok(email), Ok(password)) = (env::var("AGENDA_EMAIL"), env::var("AGENDA_PASSWORD")) else {
        bail!("Set AGENDA_EMAIL and AGENDA_PASSWORD to log in");
    };

    let mut login = LoginPage::new();
    login.form.edit(LoginField::Email, email);
    login.form.edit(LoginField::Password, password);
    if login.submit(&mut session).await.is_none() {
        let reason = login
            .form
            .banner()
            .map(str::to_string)
            .or_else(|| session.toasts.last().map(|t| t.message.clone()))
            .unwrap_or_else(|| "check the credentials format".to_string());
        bail!("Login failed: {reason}");
    }

    let mut page = CalendarPage::new(&session);
    if let Some(month) = env::args().nth(1) {
        let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
            .with_context(|| format!("Expected a month like 2024-03, got {month}"))?;
        page.view = CalendarView::new(first, page.view.today());
    }
    page.load(&mut session).await;

    if let Some(banner) = &page.banner {
        bail!("Could not load the calendar: {banner}");
    }

    println!("{}", page.grid(&session));
    for reservation in &page.reservations {
        let space = reservation
            .space
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        println!(
            "{} {}-{}  {}  [{}]  {}",
            format_date(&reservation.start_at, &tz),
            format_time(&reservation.start_at, &tz),
            format_time(&reservation.end_at, &tz),
            reservation.title,
            reservation.status.label(),
            space,
        );
    }
    info!("Printed {} reservations", page.reservations.len());

    Ok(())
}
