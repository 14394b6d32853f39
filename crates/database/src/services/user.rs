use super::{
    ServiceError,
    password::{hash_password, verify_password},
};
use crate::entities::user;
use chrono::Utc;
use log::info;
use models::user::{NewUser, User, UserChanges};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};

pub struct UserService;

impl UserService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<User>, ServiceError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<User, ServiceError> {
        user::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(User::from)
            .ok_or(ServiceError::NotFound("User"))
    }

    async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(db)
            .await?)
    }

    /// Returns the active account matching the credentials, if any
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, ServiceError> {
        let Some(model) = Self::find_by_email(db, email).await? else {
            return Ok(None);
        };

        if !model.is_active || !verify_password(password, &model.password_hash) {
            return Ok(None);
        }

        Ok(Some(model.into()))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser) -> Result<User, ServiceError> {
        let email = normalize_email(&new.email);
        if email.is_empty() {
            return Err(ServiceError::Validation("Email is required".to_string()));
        }
        if Self::find_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::Validation(
                "A user with this email already exists".to_string(),
            ));
        }

        let password = new
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ServiceError::Validation("Password is required".to_string()))?;

        let model = user::ActiveModel {
            email: Set(email),
            password_hash: Set(hash_password(&password)?),
            first_name: Set(new.first_name.trim().to_string()),
            last_name: Set(new.last_name.trim().to_string()),
            role: Set(new.role),
            is_active: Set(new.is_active),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Created user {} ({})", model.id, model.role);
        Ok(model.into())
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        changes: UserChanges,
    ) -> Result<User, ServiceError> {
        let model = user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if let Some(email) = &changes.email {
            let email = normalize_email(email);
            if let Some(other) = Self::find_by_email(db, &email).await?
                && other.id != id
            {
                return Err(ServiceError::Validation(
                    "A user with this email already exists".to_string(),
                ));
            }
        }

        let mut active: user::ActiveModel = model.into();
        if let Some(email) = changes.email {
            active.email = Set(normalize_email(&email));
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
            active.password_hash = Set(hash_password(&password)?);
        }

        let model = active.update(db).await?;
        info!("Updated user {id}");
        Ok(model.into())
    }

    /// Soft delete: the account stays for reservation history but can no longer log in
    pub async fn deactivate(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        let model = user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        let mut active: user::ActiveModel = model.into();
        active.is_active = Set(false);
        active.update(db).await?;

        info!("Deactivated user {id}");
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::user::Role;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn model(password: &str, active: bool) -> user::Model {
        user::Model {
            id: 2,
            email: "teacher@fesc.local".to_string(),
            password_hash: hash_password(password).unwrap(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            role: Role::Teacher,
            is_active: active,
            date_joined: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_checks_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model("Teacher123!", true)]])
            .append_query_results([vec![model("Teacher123!", true)]])
            .into_connection();

        let user = UserService::authenticate(&db, " Teacher@FESC.local ", "Teacher123!")
            .await
            .unwrap();
        assert_eq!(user.map(|u| u.id), Some(2));

        let wrong = UserService::authenticate(&db, "teacher@fesc.local", "nope")
            .await
            .unwrap();
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn test_inactive_users_cannot_log_in() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model("Teacher123!", false)]])
            .into_connection();

        let user = UserService::authenticate(&db, "teacher@fesc.local", "Teacher123!")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model("x", true)]])
            .into_connection();

        let new = NewUser {
            email: "teacher@fesc.local".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Teacher,
            is_active: true,
            password: Some("secret1".to_string()),
        };
        let err = UserService::create(&db, new).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = UserService::find(&db, 99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("User")));
    }
}
