//! Field-level form state shared by every editable page.
//!
//! A field is checked when it loses focus, its error is dropped as soon as it
//! is edited again, and every field is re-checked on submit. Server failures
//! are not mapped back onto fields; they land in a single banner.

mod login;
mod reservation;
mod space;
mod user;

pub use login::{LoginField, LoginForm};
pub use reservation::{ReservationField, ReservationForm};
pub use space::{SpaceField, SpaceForm};
pub use user::{UserField, UserForm};

use crate::validation::FieldError;
use std::{collections::HashMap, fmt::Debug, hash::Hash};
use thiserror::Error;

/// The values behind a form plus the rules that apply to each field
pub trait Form {
    type Field: Copy + Eq + Hash + Debug + 'static;

    /// Every field in display order
    fn fields() -> &'static [Self::Field];

    fn value(&self, field: Self::Field) -> &str;

    fn set_value(&mut self, field: Self::Field, value: String);

    /// Rule applied when `field` loses focus
    fn validate_field(&self, field: Self::Field) -> Result<(), FieldError>;

    /// Rule applied on submit; stricter forms override this
    fn validate_submit(&self, field: Self::Field) -> Result<(), FieldError> {
        self.validate_field(field)
    }
}

/// Submission was blocked by failing fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} field(s) need attention")]
pub struct FormRejected(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct FormState<F: Form> {
    values: F,
    errors: HashMap<F::Field, FieldError>,
    banner: Option<String>,
}

impl<F: Form> FormState<F> {
    pub fn new(values: F) -> Self {
        Self {
            values,
            errors: HashMap::new(),
            banner: None,
        }
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    /// Direct access for inputs that carry no rule, like checkboxes
    pub fn values_mut(&mut self) -> &mut F {
        &mut self.values
    }

    /// Stores a new value and drops the field's error without re-checking it
    pub fn edit(&mut self, field: F::Field, value: impl Into<String>) {
        self.values.set_value(field, value.into());
        self.errors.remove(&field);
    }

    /// Re-checks one field, returning its error if it failed
    pub fn blur(&mut self, field: F::Field) -> Option<&FieldError> {
        match self.values.validate_field(field) {
            Ok(()) => {
                self.errors.remove(&field);
                None
            }
            Err(err) => {
                self.errors.insert(field, err);
                self.errors.get(&field)
            }
        }
    }

    /// Re-checks every field and hands back the values when all pass.
    ///
    /// The banner from a previous attempt is cleared first.
    pub fn submit(&mut self) -> Result<&F, FormRejected> {
        self.banner = None;
        self.errors = F::fields()
            .iter()
            .filter_map(|field| {
                self.values
                    .validate_submit(*field)
                    .err()
                    .map(|err| (*field, err))
            })
            .collect();

        if self.errors.is_empty() {
            Ok(&self.values)
        } else {
            Err(FormRejected(self.errors.len()))
        }
    }

    pub fn error(&self, field: F::Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Failing fields in display order
    pub fn failing_fields(&self) -> Vec<F::Field> {
        F::fields()
            .iter()
            .copied()
            .filter(|field| self.errors.contains_key(field))
            .collect()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn set_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// Empties the given fields along with their errors
    pub fn clear_fields(&mut self, fields: &[F::Field]) {
        for field in fields {
            self.values.set_value(*field, String::new());
            self.errors.remove(field);
        }
    }

    pub fn reset(&mut self, values: F) {
        *self = Self::new(values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_clears_error_without_revalidating() {
        let mut state = FormState::new(LoginForm::default());
        assert!(state.blur(LoginField::Email).is_some());

        state.edit(LoginField::Email, "not-an-email");
        assert!(state.error(LoginField::Email).is_none());

        assert_eq!(state.blur(LoginField::Email), Some(&FieldError::InvalidEmail));
    }

    #[test]
    fn test_blur_only_touches_its_field() {
        let mut state = FormState::new(LoginForm::default());
        state.blur(LoginField::Email);
        assert!(state.error(LoginField::Password).is_none());
        assert_eq!(state.failing_fields(), vec![LoginField::Email]);
    }

    #[test]
    fn test_submit_checks_everything_and_clears_banner() {
        let mut state = FormState::new(LoginForm::default());
        state.set_banner("Server error");

        assert_eq!(state.submit().unwrap_err(), FormRejected(2));
        assert!(state.banner().is_none());
        assert_eq!(
            state.failing_fields(),
            vec![LoginField::Email, LoginField::Password]
        );

        state.edit(LoginField::Email, "teacher@fesc.local");
        state.edit(LoginField::Password, "secret");
        let values = state.submit().unwrap();
        assert_eq!(values.email, "teacher@fesc.local");
        assert!(!state.has_errors());
    }

    #[test]
    fn test_clear_fields() {
        let mut state = FormState::new(LoginForm::new("teacher@fesc.local", "x"));
        state.clear_fields(&[LoginField::Email, LoginField::Password]);
        assert_eq!(state.values().email, "");
        assert_eq!(state.values().password, "");
    }
}
