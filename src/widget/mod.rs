//! Widget API: HTTP host for embedded chat widgets.

pub mod routes;
pub mod store;

pub use routes::{UserText, WidgetReply, WidgetState, widget_routes};
pub use store::{SessionStore, spawn_expiry_task};
