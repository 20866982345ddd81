//! Authentication: login/refresh endpoint calls, the session manager that owns the
//! token lifecycle, and the guards that gate access on it.

pub mod client;
pub mod guards;
pub mod manager;
pub mod navigation;
pub mod refresh;
pub mod types;
