//! Screen state and the flows behind each screen.

pub mod admin;
pub mod calendar;
pub mod create_reservation;
pub mod dashboard;
pub mod login;
pub mod my_reservations;

use crate::session::Access;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    Calendar,
    CreateReservation,
    MyReservations,
    AdminReservations,
    AdminSpaces,
    AdminUsers,
}

impl Page {
    pub fn access(self) -> Access {
        match self {
            Page::Login => Access::Public,
            Page::Dashboard | Page::Calendar | Page::CreateReservation | Page::MyReservations => {
                Access::Authenticated
            }
            Page::AdminReservations | Page::AdminSpaces | Page::AdminUsers => Access::AdminOnly,
        }
    }
}
