use super::Form;
use crate::{
    user::{NewUser, Role, User, UserChanges},
    validation::{self, FieldError},
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Email,
    FirstName,
    LastName,
    Password,
}

/// Admin form for creating or editing an account.
///
/// The password is mandatory when creating; when editing, a blank password
/// keeps the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: Role,
    pub is_active: bool,
    creating: bool,
}

impl UserForm {
    pub fn for_create() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password: String::new(),
            role: Role::Teacher,
            is_active: true,
            creating: true,
        }
    }

    pub fn for_edit(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password: String::new(),
            role: user.role,
            is_active: user.is_active,
            creating: false,
        }
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    fn password(&self) -> Option<String> {
        if self.password.is_empty() {
            None
        } else {
            Some(self.password.clone())
        }
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role: self.role,
            is_active: self.is_active,
            password: self.password(),
        }
    }

    pub fn to_changes(&self) -> UserChanges {
        UserChanges {
            email: Some(self.email.trim().to_string()),
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            role: Some(self.role),
            is_active: Some(self.is_active),
            password: self.password(),
        }
    }
}

impl Form for UserForm {
    type Field = UserField;

    fn fields() -> &'static [UserField] {
        &[
            UserField::Email,
            UserField::FirstName,
            UserField::LastName,
            UserField::Password,
        ]
    }

    fn value(&self, field: UserField) -> &str {
        match field {
            UserField::Email => &self.email,
            UserField::FirstName => &self.first_name,
            UserField::LastName => &self.last_name,
            UserField::Password => &self.password,
        }
    }

    fn set_value(&mut self, field: UserField, value: String) {
        match field {
            UserField::Email => self.email = value,
            UserField::FirstName => self.first_name = value,
            UserField::LastName => self.last_name = value,
            UserField::Password => self.password = value,
        }
    }

    fn validate_field(&self, field: UserField) -> Result<(), FieldError> {
        match field {
            UserField::Email => validation::email(&self.email),
            UserField::FirstName => validation::required(&self.first_name, "First name"),
            UserField::LastName => validation::required(&self.last_name, "Last name"),
            UserField::Password => {
                if self.password.is_empty() {
                    return if self.creating {
                        Err(FieldError::Required("Password"))
                    } else {
                        Ok(())
                    };
                }
                if self.password.chars().count() < MIN_PASSWORD_LENGTH {
                    return Err(FieldError::TooShort {
                        field: "Password",
                        min: MIN_PASSWORD_LENGTH,
                    });
                }
                Ok(())
            }
        }
    }
}
