//! Single-flight coordination for token refresh.
//!
//! A `watch` channel carries the refresh status. `claim` is an atomic check-and-set
//! on that status, so exactly one caller becomes the leader while the others wait
//! for the leader's published outcome. The outcome stays in the channel until the
//! next claim, so a waiter that subscribes after completion still sees it.

use crate::{
    auth::types::Tokens,
    error::{Error, Result},
};
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug)]
pub(crate) enum RefreshStatus {
    Idle,
    InFlight,
    Finished(Result<Tokens>),
}

#[derive(Debug)]
pub struct RefreshCoordinator {
    status: watch::Sender<RefreshStatus>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        let (status, _) = watch::channel(RefreshStatus::Idle);
        Self { status }
    }

    /// Marks a refresh as in flight. `None` when another caller already holds it.
    pub fn claim(&self) -> Option<RefreshClaim<'_>> {
        let claimed = self.status.send_if_modified(|status| {
            if matches!(status, RefreshStatus::InFlight) {
                false
            } else {
                *status = RefreshStatus::InFlight;
                true
            }
        });

        if claimed {
            debug!("refresh claimed");
            Some(RefreshClaim {
                status: &self.status,
                finished: false,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(*self.status.borrow(), RefreshStatus::InFlight)
    }

    /// Resolves with the outcome of the current (or most recent) refresh.
    ///
    /// # Errors
    ///
    /// Returns the leader's error, or `Error::NotAuthenticated` when no refresh has
    /// ever completed.
    pub async fn wait(&self) -> Result<Tokens> {
        let mut receiver = self.status.subscribe();
        let outcome = match receiver
            .wait_for(|status| !matches!(status, RefreshStatus::InFlight))
            .await
        {
            Ok(status) => match &*status {
                RefreshStatus::Finished(outcome) => outcome.clone(),
                RefreshStatus::Idle | RefreshStatus::InFlight => Err(Error::NotAuthenticated),
            },
            Err(_) => Err(Error::NotAuthenticated),
        };
        outcome
    }
}

/// Leadership over one refresh. Publishing the outcome releases it; dropping it
/// unfinished (cancelled leader) publishes `NotAuthenticated` so waiters never hang.
#[derive(Debug)]
pub struct RefreshClaim<'a> {
    status: &'a watch::Sender<RefreshStatus>,
    finished: bool,
}

impl RefreshClaim<'_> {
    pub fn finish(mut self, outcome: &Result<Tokens>) {
        self.status
            .send_replace(RefreshStatus::Finished(outcome.clone()));
        self.finished = true;
    }
}

impl Drop for RefreshClaim<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("refresh abandoned");
            self.status
                .send_replace(RefreshStatus::Finished(Err(Error::NotAuthenticated)));
        }
    }
}
