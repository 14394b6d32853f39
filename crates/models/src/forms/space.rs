use super::Form;
use crate::{
    space::{NewSpace, Space, SpaceChanges},
    validation::{self, FieldError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceField {
    Name,
    Description,
    Location,
}

/// Admin form for creating or editing a space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceForm {
    pub name: String,
    pub description: String,
    pub location: String,
    pub is_active: bool,
}

impl Default for SpaceForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            location: String::new(),
            is_active: true,
        }
    }
}

impl From<&Space> for SpaceForm {
    fn from(space: &Space) -> Self {
        Self {
            name: space.name.clone(),
            description: space.description.clone(),
            location: space.location.clone(),
            is_active: space.is_active,
        }
    }
}

impl SpaceForm {
    pub fn to_new_space(&self) -> NewSpace {
        NewSpace {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            is_active: self.is_active,
        }
    }

    pub fn to_changes(&self) -> SpaceChanges {
        SpaceChanges {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            is_active: Some(self.is_active),
        }
    }
}

impl Form for SpaceForm {
    type Field = SpaceField;

    fn fields() -> &'static [SpaceField] {
        &[SpaceField::Name, SpaceField::Description, SpaceField::Location]
    }

    fn value(&self, field: SpaceField) -> &str {
        match field {
            SpaceField::Name => &self.name,
            SpaceField::Description => &self.description,
            SpaceField::Location => &self.location,
        }
    }

    fn set_value(&mut self, field: SpaceField, value: String) {
        match field {
            SpaceField::Name => self.name = value,
            SpaceField::Description => self.description = value,
            SpaceField::Location => self.location = value,
        }
    }

    fn validate_field(&self, field: SpaceField) -> Result<(), FieldError> {
        match field {
            SpaceField::Name => {
                validation::required(&self.name, "Name")?;
                validation::min_length(&self.name, "Name", 2)
            }
            SpaceField::Description => validation::required(&self.description, "Description"),
            SpaceField::Location => validation::required(&self.location, "Location"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        let mut form = SpaceForm::default();
        assert_eq!(
            form.validate_field(SpaceField::Name),
            Err(FieldError::Required("Name"))
        );
        form.name = "A".to_string();
        assert_eq!(
            form.validate_field(SpaceField::Name),
            Err(FieldError::TooShort {
                field: "Name",
                min: 2
            })
        );
        form.name = "Aula".to_string();
        assert_eq!(form.validate_field(SpaceField::Name), Ok(()));
    }

    #[test]
    fn test_description_and_location_required() {
        let form = SpaceForm {
            name: "Aula".to_string(),
            ..SpaceForm::default()
        };
        assert!(form.validate_field(SpaceField::Description).is_err());
        assert!(form.validate_field(SpaceField::Location).is_err());
    }

    #[test]
    fn test_new_space_is_trimmed() {
        let form = SpaceForm {
            name: " Módulo 3 ".to_string(),
            description: "Sala".to_string(),
            location: " Bloque A".to_string(),
            is_active: false,
        };
        let space = form.to_new_space();
        assert_eq!(space.name, "Módulo 3");
        assert_eq!(space.location, "Bloque A");
        assert!(!space.is_active);
    }
}
