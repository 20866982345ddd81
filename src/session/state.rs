//! In-memory session flags shared with every consumer through `Arc<SessionState>`.
//!
//! Each field is observed independently. The layer does not keep `is_authenticated`
//! and `current_user` consistent with each other; `AuthSession` is the only writer
//! and changes them together.

use crate::{auth::types::User, session::observable::Observable};

#[derive(Debug, Default)]
pub struct SessionState {
    pub is_authenticated: Observable<bool>,
    pub current_user: Observable<Option<User>>,
    pub is_loading: Observable<bool>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_authenticated(&self, value: bool) {
        self.is_authenticated.set(value);
    }

    pub fn set_current_user(&self, user: Option<User>) {
        self.current_user.set(user);
    }

    pub fn set_loading(&self, value: bool) {
        self.is_loading.set(value);
    }

    #[must_use]
    pub fn authenticated(&self) -> bool {
        self.is_authenticated.get()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.current_user.get()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.is_loading.get()
    }

    /// Back to the initial `false` / `None` / `false`.
    pub fn reset(&self) {
        self.set_authenticated(false);
        self.set_current_user(None);
        self.set_loading(false);
    }
}
