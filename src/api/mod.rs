//! HTTP surface: `/ask`, `/clear-chat` and `/health`.

pub mod routes;
pub mod server;

pub use routes::{AskRequest, AskResponse, ClearRequest, DeskRouteState, desk_routes};
pub use server::{desk_app, serve};
