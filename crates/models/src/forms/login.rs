use super::Form;
use crate::{
    auth::Credentials,
    validation::{self, FieldError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

impl Form for LoginForm {
    type Field = LoginField;

    fn fields() -> &'static [LoginField] {
        &[LoginField::Email, LoginField::Password]
    }

    fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::Email => &self.email,
            LoginField::Password => &self.password,
        }
    }

    fn set_value(&mut self, field: LoginField, value: String) {
        match field {
            LoginField::Email => self.email = value,
            LoginField::Password => self.password = value,
        }
    }

    fn validate_field(&self, field: LoginField) -> Result<(), FieldError> {
        match field {
            LoginField::Email => validation::email(&self.email),
            LoginField::Password => validation::required(&self.password, "Password"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules() {
        let form = LoginForm::new("teacher@fesc.local", "   ");
        assert_eq!(form.validate_field(LoginField::Email), Ok(()));
        assert_eq!(
            form.validate_field(LoginField::Password),
            Err(FieldError::Required("Password"))
        );
    }

    #[test]
    fn test_credentials_trim_email_only() {
        let form = LoginForm::new(" teacher@fesc.local ", " pass ");
        let credentials = form.credentials();
        assert_eq!(credentials.email, "teacher@fesc.local");
        assert_eq!(credentials.password, " pass ");
    }
}
