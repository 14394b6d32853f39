use crate::{services::users, session::Session};
use log::info;
use models::{
    forms::{FormState, UserForm},
    user::User,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AdminUsersPage {
    pub users: Vec<User>,
    pub form: FormState<UserForm>,
    pub editing: Option<i32>,
    pub banner: Option<String>,
}

impl Default for AdminUsersPage {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            form: FormState::new(UserForm::for_create()),
            editing: None,
            banner: None,
        }
    }
}

impl AdminUsersPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, session: &mut Session) {
        match users::list(&session.api).await {
            Ok(users) => {
                self.users = users;
                self.banner = None;
            }
            Err(err) => self.banner = session.report(&err),
        }
    }

    pub fn start_create(&mut self) {
        self.editing = None;
        self.form.reset(UserForm::for_create());
    }

    pub fn start_edit(&mut self, user: &User) {
        self.editing = Some(user.id);
        self.form.reset(UserForm::for_edit(user));
    }

    pub async fn submit(&mut self, session: &mut Session) -> bool {
        let Ok(values) = self.form.submit() else {
            return false;
        };

        let result = match self.editing {
            Some(id) => users::update(&session.api, id, &values.to_changes()).await,
            None => users::create(&session.api, &values.to_new_user()).await,
        };

        match result {
            Ok(user) => {
                info!("Saved user {}", user.id);
                session.toasts.success("User saved");
                self.start_create();
                self.load(session).await;
                true
            }
            Err(err) => {
                if let Some(message) = session.report(&err) {
                    self.form.set_banner(message);
                }
                false
            }
        }
    }

    /// Deactivates the account; it stays in the list as inactive
    pub async fn deactivate(&mut self, session: &mut Session, id: i32) -> bool {
        match users::delete(&session.api, id).await {
            Ok(()) => {
                session.toasts.success("User deactivated");
                self.load(session).await;
                true
            }
            Err(err) => {
                self.banner = session.report(&err);
                false
            }
        }
    }
}
