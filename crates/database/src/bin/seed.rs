use anyhow::Context;
use database::{
    db::create_connection,
    services::{ServiceError, space::SpaceService, user::UserService},
};
use log::info;
use models::user::{NewUser, Role};
use std::env;

const DEFAULT_SPACE: &str = "Módulo 3";

/// Creates the demo admin, the demo teacher and the default space if missing
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = create_connection(&database_url).await?;

    for (email, password, role) in [
        ("admin@fesc.local", "Admin123!", Role::Admin),
        ("teacher@fesc.local", "Teacher123!", Role::Teacher),
    ] {
        let new = NewUser {
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
            password: Some(password.to_string()),
        };

        match UserService::create(&db, new).await {
            Ok(user) => info!("Created {role} {} / {password}", user.email),
            Err(ServiceError::Validation(_)) => info!("{role} {email} already exists"),
            Err(e) => return Err(e.into()),
        }
    }

    let space_name = env::var("DEFAULT_SPACE_NAME").unwrap_or_else(|_| DEFAULT_SPACE.to_string());
    let space = SpaceService::get_or_create_default(&db, &space_name).await?;
    info!("Space '{}' ready (id {})", space.name, space.id);

    Ok(())
}
