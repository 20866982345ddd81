//! Session state published to UI-side consumers.

pub mod observable;
pub mod state;
