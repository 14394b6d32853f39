use super::{ServiceError, space::SpaceService};
use crate::entities::{reservation, space, user};
use chrono::{DateTime, Utc};
use log::{debug, info};
use models::{
    reservation::{NewReservation, Reservation, ReservationChanges, ReservationStatus},
    space::Space,
    user::{User, UserBasic},
    validation::DurationPolicy,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use std::collections::{HashMap, HashSet};

/// Filters of the PDF report
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub space_id: Option<i32>,
    /// `None` lists every status
    pub statuses: Option<Vec<ReservationStatus>>,
}

/// Rules applied when reservations are created or moved
#[derive(Debug, Clone)]
pub struct BookingRules {
    pub duration: DurationPolicy,
    /// Space used when a request does not name one
    pub default_space: String,
}

pub struct ReservationService;

impl ReservationService {
    /// Reservations intersecting `[start, end)`, newest first
    pub async fn list(
        db: &DatabaseConnection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        space_id: Option<i32>,
        statuses: Option<&[ReservationStatus]>,
    ) -> Result<Vec<Reservation>, ServiceError> {
        let mut query = reservation::Entity::find().filter(overlapping(start, end));

        if let Some(space_id) = space_id {
            query = query.filter(reservation::Column::SpaceId.eq(space_id));
        }
        if let Some(statuses) = statuses {
            query = query.filter(reservation::Column::Status.is_in(statuses.iter().copied()));
        }

        let rows = query
            .order_by_desc(reservation::Column::StartAt)
            .all(db)
            .await?;

        Ok(hydrate(db, rows).await?)
    }

    /// Everything the user booked, optionally limited to `[start, end)`, newest first
    pub async fn mine(
        db: &DatabaseConnection,
        user_id: i32,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Reservation>, ServiceError> {
        let mut query =
            reservation::Entity::find().filter(reservation::Column::CreatedById.eq(user_id));

        if let Some((start, end)) = range {
            query = query.filter(overlapping(start, end));
        }

        let rows = query
            .order_by_desc(reservation::Column::StartAt)
            .all(db)
            .await?;

        Ok(hydrate(db, rows).await?)
    }

    /// Rows for the PDF report, grouped by space name then start time.
    ///
    /// Unlike the listing, both ends of the range are inclusive.
    pub async fn report(
        db: &DatabaseConnection,
        filter: ReportFilter,
    ) -> Result<Vec<Reservation>, ServiceError> {
        let mut query = reservation::Entity::find();

        if let Some(start) = filter.start {
            query = query.filter(reservation::Column::EndAt.gte(start));
        }
        if let Some(end) = filter.end {
            query = query.filter(reservation::Column::StartAt.lte(end));
        }
        if let Some(space_id) = filter.space_id {
            query = query.filter(reservation::Column::SpaceId.eq(space_id));
        }
        if let Some(statuses) = filter.statuses {
            query = query.filter(reservation::Column::Status.is_in(statuses));
        }

        let rows = query
            .order_by_asc(reservation::Column::StartAt)
            .all(db)
            .await?;

        let mut reservations = hydrate(db, rows).await?;
        // stable sort keeps start order within a space
        reservations.sort_by(|a, b| space_name(a).cmp(space_name(b)));
        Ok(reservations)
    }

    pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Reservation, ServiceError> {
        let model = Self::find_model(db, id).await?;
        Self::hydrate_one(db, model).await
    }

    async fn find_model<C: ConnectionTrait>(
        db: &C,
        id: i32,
    ) -> Result<reservation::Model, ServiceError> {
        reservation::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Reservation"))
    }

    async fn hydrate_one<C: ConnectionTrait>(
        db: &C,
        model: reservation::Model,
    ) -> Result<Reservation, ServiceError> {
        hydrate(db, vec![model])
            .await?
            .pop()
            .ok_or(ServiceError::NotFound("Reservation"))
    }

    /// Books a space for `actor`; the new reservation starts out pending
    pub async fn create(
        db: &DatabaseConnection,
        actor: &User,
        new: NewReservation,
        rules: &BookingRules,
    ) -> Result<Reservation, ServiceError> {
        if new.title.trim().is_empty() {
            return Err(ServiceError::Validation("Title is required".to_string()));
        }
        rules.duration.check(&new.start_at, &new.end_at)?;

        let txn = db.begin().await?;

        let space = match new.space_id {
            Some(id) => space::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::Validation("Space not found".to_string()))?,
            None => SpaceService::get_or_create_default(&txn, &rules.default_space).await?,
        };

        ensure_free(&txn, space.id, new.start_at, new.end_at, None).await?;

        let now = Utc::now();
        let model = reservation::ActiveModel {
            space_id: Set(space.id),
            created_by_id: Set(actor.id),
            title: Set(new.title),
            description: Set(new.description),
            start_at: Set(new.start_at),
            end_at: Set(new.end_at),
            status: Set(ReservationStatus::Pending),
            approved_by_id: Set(None),
            decision_at: Set(None),
            decision_note: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let reservation = Self::hydrate_one(&txn, model).await?;
        txn.commit().await?;

        info!(
            "User {} requested space {} from {} to {}",
            actor.id, space.id, reservation.start_at, reservation.end_at
        );
        Ok(reservation)
    }

    /// Admin edit; moving the window re-runs the duration and overlap checks
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        changes: ReservationChanges,
        rules: &BookingRules,
    ) -> Result<Reservation, ServiceError> {
        let txn = db.begin().await?;
        let model = Self::find_model(&txn, id).await?;

        let start_at = changes.start_at.unwrap_or(model.start_at);
        let end_at = changes.end_at.unwrap_or(model.end_at);
        if start_at != model.start_at || end_at != model.end_at {
            rules.duration.check(&start_at, &end_at)?;
            ensure_free(&txn, model.space_id, start_at, end_at, Some(model.id)).await?;
        }

        let mut active: reservation::ActiveModel = model.into();
        if let Some(title) = changes.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation("Title is required".to_string()));
            }
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        active.start_at = Set(start_at);
        active.end_at = Set(end_at);
        active.updated_at = Set(Utc::now());

        let model = active.update(&txn).await?;
        let reservation = Self::hydrate_one(&txn, model).await?;
        txn.commit().await?;

        info!("Updated reservation {id}");
        Ok(reservation)
    }

    /// Withdraws a reservation. Only its owner or an admin may do so.
    pub async fn cancel(
        db: &DatabaseConnection,
        actor: &User,
        id: i32,
    ) -> Result<Reservation, ServiceError> {
        let txn = db.begin().await?;
        let model = Self::find_model(&txn, id).await?;

        if !actor.is_admin() && model.created_by_id != actor.id {
            return Err(ServiceError::PermissionDenied(
                "You cannot cancel another user's reservation",
            ));
        }

        let now = Utc::now();
        let mut active: reservation::ActiveModel = model.into();
        active.status = Set(ReservationStatus::Cancelled);
        active.decision_at = Set(Some(now));
        active.approved_by_id = Set(None);
        active.decision_note = Set(String::new());
        active.updated_at = Set(now);

        let model = active.update(&txn).await?;
        let reservation = Self::hydrate_one(&txn, model).await?;
        txn.commit().await?;

        info!("User {} cancelled reservation {id}", actor.id);
        Ok(reservation)
    }

    pub async fn approve(
        db: &DatabaseConnection,
        admin: &User,
        id: i32,
        note: Option<String>,
    ) -> Result<Reservation, ServiceError> {
        Self::decide(db, admin, id, ReservationStatus::Approved, note).await
    }

    pub async fn reject(
        db: &DatabaseConnection,
        admin: &User,
        id: i32,
        note: Option<String>,
    ) -> Result<Reservation, ServiceError> {
        Self::decide(db, admin, id, ReservationStatus::Rejected, note).await
    }

    async fn decide(
        db: &DatabaseConnection,
        admin: &User,
        id: i32,
        status: ReservationStatus,
        note: Option<String>,
    ) -> Result<Reservation, ServiceError> {
        if !admin.is_admin() {
            return Err(ServiceError::PermissionDenied(
                "Only admins can decide on reservations",
            ));
        }

        let txn = db.begin().await?;
        let model = Self::find_model(&txn, id).await?;

        let now = Utc::now();
        let mut active: reservation::ActiveModel = model.into();
        active.status = Set(status);
        active.approved_by_id = Set(Some(admin.id));
        active.decision_at = Set(Some(now));
        active.decision_note = Set(note.unwrap_or_default());
        active.updated_at = Set(now);

        let model = active.update(&txn).await?;
        let reservation = Self::hydrate_one(&txn, model).await?;
        txn.commit().await?;

        info!("Admin {} marked reservation {id} as {status}", admin.id);
        Ok(reservation)
    }
}

/// Half-open interval intersection with `[start, end)`
fn overlapping(start: DateTime<Utc>, end: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(reservation::Column::StartAt.lt(end))
        .add(reservation::Column::EndAt.gt(start))
}

/// Fails when a pending or approved reservation of the space intersects the window.
///
/// A clashing row is locked for the rest of the transaction. An empty window
/// is not reserved, so two transactions booking the same free slot can both pass.
async fn ensure_free(
    txn: &DatabaseTransaction,
    space_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i32>,
) -> Result<(), ServiceError> {
    let mut query = reservation::Entity::find()
        .filter(reservation::Column::SpaceId.eq(space_id))
        .filter(reservation::Column::Status.is_in(ReservationStatus::ACTIVE))
        .filter(overlapping(start, end));

    if let Some(id) = exclude {
        query = query.filter(reservation::Column::Id.ne(id));
    }

    if let Some(conflict) = query.lock_exclusive().one(txn).await? {
        debug!(
            "Window {start} - {end} in space {space_id} clashes with reservation {}",
            conflict.id
        );
        return Err(ServiceError::Validation(
            "A reservation already exists in that time range".to_string(),
        ));
    }

    Ok(())
}

fn space_name(reservation: &Reservation) -> &str {
    reservation
        .space
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or_default()
}

/// Attaches spaces and users to reservation rows in two batched lookups
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    rows: Vec<reservation::Model>,
) -> Result<Vec<Reservation>, sea_orm::DbErr> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let space_ids: HashSet<i32> = rows.iter().map(|r| r.space_id).collect();
    let user_ids: HashSet<i32> = rows
        .iter()
        .flat_map(|r| std::iter::once(r.created_by_id).chain(r.approved_by_id))
        .collect();

    // Build lookup maps
    let spaces: HashMap<i32, Space> = space::Entity::find()
        .filter(space::Column::Id.is_in(space_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, Space::from(s)))
        .collect();

    let users: HashMap<i32, UserBasic> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .iter()
        .map(|u| (u.id, UserBasic::from(u)))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| row.into_reservation(&spaces, &users))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use models::user::Role;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, 0, 0).unwrap()
    }

    fn actor(id: i32, role: Role) -> User {
        User {
            id,
            email: format!("user{id}@fesc.local"),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
            date_joined: at(0),
        }
    }

    fn rules() -> BookingRules {
        BookingRules {
            duration: DurationPolicy::default(),
            default_space: "Módulo 3".to_string(),
        }
    }

    fn row(id: i32, owner: i32) -> reservation::Model {
        reservation::Model {
            id,
            space_id: 1,
            created_by_id: owner,
            title: "Clase".to_string(),
            description: String::new(),
            start_at: at(9),
            end_at: at(10),
            status: ReservationStatus::Pending,
            approved_by_id: None,
            decision_at: None,
            decision_note: String::new(),
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn space_row() -> space::Model {
        space::Model {
            id: 1,
            name: "Módulo 3".to_string(),
            description: String::new(),
            location: "Biblioteca".to_string(),
            is_active: true,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn owner_row() -> user::Model {
        user::Model {
            id: 2,
            email: "teacher@fesc.local".to_string(),
            password_hash: String::new(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            role: Role::Teacher,
            is_active: true,
            date_joined: at(0),
        }
    }

    fn logged_sql(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    fn new_reservation(start: DateTime<Utc>, end: DateTime<Utc>) -> NewReservation {
        NewReservation {
            title: "Clase".to_string(),
            description: String::new(),
            start_at: start,
            end_at: end,
            space_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_duration_before_touching_db() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let teacher = actor(2, Role::Teacher);

        let too_short = new_reservation(at(9), at(9) + Duration::minutes(20));
        let err = ReservationService::create(&db, &teacher, too_short, &rules())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let reversed = new_reservation(at(10), at(9));
        let err = ReservationService::create(&db, &teacher, reversed, &rules())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut blank = new_reservation(at(9), at(10));
        blank.title = "  ".to_string();

        let err = ReservationService::create(&db, &actor(2, Role::Teacher), blank, &rules())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_overlap() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![space_row()]])
            .append_query_results([vec![row(8, 3)]])
            .into_connection();

        let err = ReservationService::create(
            &db,
            &actor(2, Role::Teacher),
            new_reservation(at(9), at(10)),
            &rules(),
        )
        .await
        .unwrap_err();

        match err {
            ServiceError::Validation(msg) => {
                assert_eq!(msg, "A reservation already exists in that time range")
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert!(logged_sql(db).contains("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_create_in_free_window_is_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![space_row()]])
            .append_query_results([Vec::<reservation::Model>::new()])
            .append_query_results([vec![row(9, 2)]])
            .append_query_results([vec![space_row()]])
            .append_query_results([vec![owner_row()]])
            .into_connection();

        let created = ReservationService::create(
            &db,
            &actor(2, Role::Teacher),
            new_reservation(at(9), at(10)),
            &rules(),
        )
        .await
        .unwrap();

        assert_eq!(created.id, 9);
        assert_eq!(created.status, ReservationStatus::Pending);
        assert_eq!(created.space.as_ref().map(|s| s.id), Some(1));
    }

    #[tokio::test]
    async fn test_update_without_new_dates_skips_overlap_check() {
        let mut renamed = row(7, 2);
        renamed.title = "Renamed".to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(7, 2)]])
            .append_query_results([vec![renamed]])
            .append_query_results([vec![space_row()]])
            .append_query_results([vec![owner_row()]])
            .into_connection();

        let changes = ReservationChanges {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = ReservationService::update(&db, 7, changes, &rules())
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert!(!logged_sql(db).contains("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_update_with_new_dates_rechecks_overlap() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(7, 2)]])
            .append_query_results([vec![row(8, 3)]])
            .into_connection();

        let changes = ReservationChanges {
            start_at: Some(at(11)),
            end_at: Some(at(12)),
            ..Default::default()
        };
        let err = ReservationService::update(&db, 7, changes, &rules())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(logged_sql(db).contains("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_cancel_by_stranger_is_denied() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(7, 2)]])
            .into_connection();

        let err = ReservationService::cancel(&db, &actor(3, Role::Teacher), 7)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_decisions_need_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = ReservationService::approve(&db, &actor(2, Role::Teacher), 7, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_missing_reservation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reservation::Model>::new()])
            .into_connection();

        let err = ReservationService::find(&db, 404).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Reservation")));
    }

    #[tokio::test]
    async fn test_hydrate_attaches_space_and_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![space_row()]])
            .append_query_results([vec![owner_row()]])
            .into_connection();

        let hydrated = hydrate(&db, vec![row(7, 2)]).await.unwrap();
        assert_eq!(hydrated.len(), 1);
        assert_eq!(hydrated[0].space.as_ref().map(|s| s.id), Some(1));
        assert_eq!(
            hydrated[0].created_by.as_ref().map(|u| u.display_name()),
            Some("Ana Ruiz".to_string())
        );
        assert!(hydrated[0].approved_by.is_none());
    }

    #[tokio::test]
    async fn test_hydrate_empty_skips_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        assert!(hydrate(&db, vec![]).await.unwrap().is_empty());
        assert!(db.into_transaction_log().is_empty());
    }
}
