use crate::{services::spaces, session::Session};
use log::info;
use models::{
    forms::{FormState, SpaceForm},
    space::Space,
};

/// Space list plus the create/edit dialog
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSpacesPage {
    pub spaces: Vec<Space>,
    pub form: FormState<SpaceForm>,
    /// Id of the space being edited; `None` while creating
    pub editing: Option<i32>,
    pub banner: Option<String>,
}

impl Default for AdminSpacesPage {
    fn default() -> Self {
        Self {
            spaces: Vec::new(),
            form: FormState::new(SpaceForm::default()),
            editing: None,
            banner: None,
        }
    }
}

impl AdminSpacesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, session: &mut Session) {
        match spaces::list(&session.api).await {
            Ok(spaces) => {
                self.spaces = spaces;
                self.banner = None;
            }
            Err(err) => self.banner = session.report(&err),
        }
    }

    pub fn start_create(&mut self) {
        self.editing = None;
        self.form.reset(SpaceForm::default());
    }

    pub fn start_edit(&mut self, space: &Space) {
        self.editing = Some(space.id);
        self.form.reset(SpaceForm::from(space));
    }

    pub async fn submit(&mut self, session: &mut Session) -> bool {
        let Ok(values) = self.form.submit() else {
            return false;
        };

        let result = match self.editing {
            Some(id) => spaces::update(&session.api, id, &values.to_changes()).await,
            None => spaces::create(&session.api, &values.to_new_space()).await,
        };

        match result {
            Ok(space) => {
                info!("Saved space {}", space.id);
                session.toasts.success("Space saved");
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

    /// Spaces that still have reservations are refused by the server
    pub async fn delete(&mut self, session: &mut Session, id: i32) -> bool {
        match spaces::delete(&session.api, id).await {
            Ok(()) => {
                session.toasts.success("Space deleted");
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
