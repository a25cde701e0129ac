mod extract;
pub mod handlers;
mod routes;
mod state;

pub use extract::{CategoryId, ViewerId, VIEWER_ID_HEADER};
pub use routes::create_router;
pub use state::AppState;
