pub mod auth;
pub mod error;
mod forms;
mod routes;
pub mod state;

pub use routes::router;
pub use state::WebState;
