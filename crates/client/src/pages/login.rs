use crate::{
    error::{ApiError, Failure},
    services::auth,
    session::Session,
};
use log::warn;
use models::{
    forms::{FormState, LoginField, LoginForm},
    user::User,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LoginPage {
    pub form: FormState<LoginForm>,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            form: FormState::new(LoginForm::default()),
        }
    }
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs in and loads the account.
    ///
    /// Returns the user on success. Rejected credentials empty both fields.
    pub async fn submit(&mut self, session: &mut Session) -> Option<User> {
        let credentials = match self.form.submit() {
            Ok(form) => form.credentials(),
            Err(_) => return None,
        };

        let result = match auth::login(&session.api, &credentials).await {
            Ok(_) => auth::me(&session.api).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                session.toasts.success(format!("Welcome, {}", user.display_name()));
                session.user = Some(user.clone());
                Some(user)
            }
            Err(err) => {
                self.fail(session, &err);
                None
            }
        }
    }

    fn fail(&mut self, session: &mut Session, err: &ApiError) {
        warn!("Login failed: {err}");
        if err.failure() == Failure::InvalidCredentials {
            self.form
                .clear_fields(&[LoginField::Email, LoginField::Password]);
            auth::logout(&session.api);
        }
        if let Some(message) = session.report(err) {
            self.form.set_banner(message);
        }
    }
}
