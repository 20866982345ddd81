pub mod request;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::config::ClientConfig;

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Register(session::RegisterArgs),
    Logout(ClientConfig),
    Refresh(ClientConfig),
    Status(ClientConfig),
    Request(request::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
