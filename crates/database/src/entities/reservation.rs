use models::{
    reservation::{Reservation, ReservationStatus},
    space::{BusyBlock, Space},
    user::UserBasic,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub space_id: i32,
    pub created_by_id: i32,
    pub title: String,
    pub description: String,
    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,
    pub status: ReservationStatus,
    pub approved_by_id: Option<i32>,
    pub decision_at: Option<DateTimeUtc>,
    pub decision_note: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::space::Entity",
        from = "Column::SpaceId",
        to = "super::space::Column::Id"
    )]
    Space,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedById",
        to = "super::user::Column::Id"
    )]
    CreatedBy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApprovedById",
        to = "super::user::Column::Id"
    )]
    ApprovedBy,
}

impl Related<super::space::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Space.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds the API shape using prefetched spaces and users
    pub fn into_reservation(
        self,
        spaces: &HashMap<i32, Space>,
        users: &HashMap<i32, UserBasic>,
    ) -> Reservation {
        Reservation {
            id: self.id,
            space: spaces.get(&self.space_id).cloned(),
            created_by: users.get(&self.created_by_id).cloned(),
            approved_by: self.approved_by_id.and_then(|id| users.get(&id).cloned()),
            title: self.title,
            description: self.description,
            start_at: self.start_at,
            end_at: self.end_at,
            status: self.status,
            decision_at: self.decision_at,
            decision_note: self.decision_note,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }

    pub fn busy_block(&self) -> BusyBlock {
        BusyBlock {
            start_at: self.start_at,
            end_at: self.end_at,
        }
    }
}
