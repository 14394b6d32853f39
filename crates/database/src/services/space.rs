use super::ServiceError;
use crate::entities::{reservation, space};
use chrono::{DateTime, Utc};
use log::info;
use models::{
    reservation::ReservationStatus,
    space::{Availability, NewSpace, Space, SpaceChanges},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};

pub const DEFAULT_SPACE_DESCRIPTION: &str = "Default library space";

pub struct SpaceService;

impl SpaceService {
    /// Every space, active or not
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<Space>, ServiceError> {
        let spaces = space::Entity::find()
            .order_by_asc(space::Column::Id)
            .all(db)
            .await?;

        Ok(spaces.into_iter().map(Space::from).collect())
    }

    pub async fn find_model<C: ConnectionTrait>(
        db: &C,
        id: i32,
    ) -> Result<space::Model, ServiceError> {
        space::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Space"))
    }

    pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Space, ServiceError> {
        Self::find_model(db, id).await.map(Space::from)
    }

    pub async fn create<C: ConnectionTrait>(db: &C, new: NewSpace) -> Result<Space, ServiceError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }

        let now = Utc::now();
        let model = space::ActiveModel {
            name: Set(name),
            description: Set(new.description),
            location: Set(new.location),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Created space {} ({})", model.id, model.name);
        Ok(model.into())
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        changes: SpaceChanges,
    ) -> Result<Space, ServiceError> {
        let mut active: space::ActiveModel = Self::find_model(db, id).await?.into();

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::Validation("Name is required".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(location) = changes.location {
            active.location = Set(location);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(db).await?;
        info!("Updated space {id}");
        Ok(model.into())
    }

    /// Deletes a space that no reservation refers to
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        let model = Self::find_model(db, id).await?;

        let referenced = model
            .find_related(reservation::Entity)
            .one(db)
            .await?
            .is_some();
        if referenced {
            return Err(ServiceError::Validation(
                "The space cannot be deleted because it has reservations. Delete its reservations first."
                    .to_string(),
            ));
        }

        model.delete(db).await?;
        info!("Deleted space {id}");
        Ok(())
    }

    /// Pending and approved blocks of a space intersecting `[start, end)`
    pub async fn availability(
        db: &DatabaseConnection,
        id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Availability, ServiceError> {
        if start >= end {
            return Err(ServiceError::Validation(
                "Start must be before end".to_string(),
            ));
        }

        let space = Self::find_model(db, id).await?;
        let busy = reservation::Entity::find()
            .filter(reservation::Column::SpaceId.eq(space.id))
            .filter(reservation::Column::Status.is_in(ReservationStatus::ACTIVE))
            .filter(reservation::Column::StartAt.lt(end))
            .filter(reservation::Column::EndAt.gt(start))
            .order_by_asc(reservation::Column::StartAt)
            .all(db)
            .await?
            .iter()
            .map(reservation::Model::busy_block)
            .collect();

        Ok(Availability {
            space_id: space.id,
            start,
            end,
            busy,
        })
    }

    /// Finds the space reservations fall back to, creating it on first use
    pub async fn get_or_create_default<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<space::Model, ServiceError> {
        if let Some(existing) = space::Entity::find()
            .filter(space::Column::Name.eq(name))
            .order_by_asc(space::Column::Id)
            .one(db)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = space::ActiveModel {
            name: Set(name.to_string()),
            description: Set(DEFAULT_SPACE_DESCRIPTION.to_string()),
            location: Set(String::new()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Created default space {} ({name})", model.id);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn space_model(id: i32) -> space::Model {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        space::Model {
            id,
            name: "Módulo 3".to_string(),
            description: String::new(),
            location: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn reservation_model(id: i32, space_id: i32) -> reservation::Model {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        reservation::Model {
            id,
            space_id,
            created_by_id: 2,
            title: "Clase".to_string(),
            description: String::new(),
            start_at: start,
            end_at: start + chrono::Duration::hours(1),
            status: ReservationStatus::Approved,
            approved_by_id: None,
            decision_at: None,
            decision_note: String::new(),
            created_at: start,
            updated_at: start,
        }
    }

    #[tokio::test]
    async fn test_delete_refused_while_referenced() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![space_model(1)]])
            .append_query_results([vec![reservation_model(5, 1)]])
            .into_connection();

        let err = SpaceService::delete(&db, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_availability_lists_busy_blocks() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![space_model(1)]])
            .append_query_results([vec![reservation_model(5, 1)]])
            .into_connection();

        let start = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        let availability = SpaceService::availability(&db, 1, start, end)
            .await
            .unwrap();

        assert_eq!(availability.space_id, 1);
        assert_eq!(availability.busy.len(), 1);
        assert!(!availability.is_free(
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 11, 0, 0).unwrap()
        ));
    }

    #[tokio::test]
    async fn test_availability_rejects_reversed_range() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let err = SpaceService::availability(&db, 1, at, at).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_default_space_reused_when_present() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![space_model(3)]])
            .into_connection();

        let space = SpaceService::get_or_create_default(&db, "Módulo 3")
            .await
            .unwrap();
        assert_eq!(space.id, 3);
    }
}
