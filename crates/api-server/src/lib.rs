//! REST API server: routers, handlers, the authentication middleware, and
//! the uniform response envelope.

pub mod analytics_rest;
pub mod auth_rest;
pub mod blacklist_rest;
pub mod campaigns_rest;
pub mod contacts_rest;
pub mod envelope;
pub mod guard;
pub mod press_rest;
pub mod rest;
pub mod router;
pub mod server;
pub mod state;
pub mod upload_rest;
pub mod users_rest;

pub use router::api_router;
pub use server::ApiServer;
pub use state::AppState;
