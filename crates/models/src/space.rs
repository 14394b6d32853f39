use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable room or resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Space {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Space {
    /// Label used in space pickers: "Name - Location"
    pub fn label(&self) -> String {
        if self.location.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.location)
        }
    }
}

/// Spaces that can still be booked, in server order
pub fn active_spaces(spaces: &[Space]) -> Vec<Space> {
    spaces.iter().filter(|s| s.is_active).cloned().collect()
}

/// Payload for creating a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewSpace {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update of a space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SpaceChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// One occupied interval of a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BusyBlock {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Response of `GET /spaces/{id}/availability/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Availability {
    pub space_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub busy: Vec<BusyBlock>,
}

impl Availability {
    /// Whether `[start, end)` intersects any busy block
    pub fn is_free(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !self
            .busy
            .iter()
            .any(|block| block.start_at < end && block.end_at > start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn space(id: i32, active: bool) -> Space {
        Space {
            id,
            name: format!("Room {id}"),
            description: String::new(),
            location: "Library".to_string(),
            is_active: active,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_active_spaces_keeps_order() {
        let spaces = vec![space(3, true), space(1, false), space(2, true)];
        let ids: Vec<i32> = active_spaces(&spaces).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_label() {
        assert_eq!(space(1, true).label(), "Room 1 - Library");
        let mut bare = space(2, true);
        bare.location.clear();
        assert_eq!(bare.label(), "Room 2");
    }

    #[test]
    fn test_availability_is_free_uses_half_open_intervals() {
        let at = |h| Utc.with_ymd_and_hms(2024, 3, 10, h, 0, 0).unwrap();
        let availability = Availability {
            space_id: 1,
            start: at(0),
            end: at(23),
            busy: vec![BusyBlock {
                start_at: at(9),
                end_at: at(10),
            }],
        };
        assert!(availability.is_free(at(10), at(11)));
        assert!(availability.is_free(at(8), at(9)));
        assert!(!availability.is_free(at(8), at(10)));
    }
}
