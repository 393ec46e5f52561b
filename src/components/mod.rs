pub mod common;
pub mod home_page;
pub mod nav_bar;
pub mod profile_page;

use dioxus::prelude::*;
use crate::backend::screen::ProfileScreen;
use crate::backend::session::Session;
use crate::backend::{AppCmd, AppEvent};

#[derive(Clone, Copy)]
pub struct AppState {
    pub session: Signal<Session>,
    pub screen: Signal<ProfileScreen>,
}

impl AppState {
    pub fn new(session: impl FnOnce() -> Session) -> Self {
        Self {
            session: use_signal(session),
            screen: use_signal(ProfileScreen::new),
        }
    }

    /// Feeds a backend event to the profile screen. Returns the follow-up command, if any.
    pub fn apply(&mut self, event: AppEvent) -> Option<AppCmd> {
        let mut session = self.session.write();
        self.screen.write().apply(event, &mut session)
    }
}
