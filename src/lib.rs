mod app;
mod chunker;
mod config;
mod errors;
mod extractors;
mod models;
mod response;
mod routes;
pub mod schema;
mod services;
mod state;
mod tokens;

pub use app::*;
pub use chunker::*;
pub use config::*;
pub use errors::*;
pub use extractors::*;
pub use models::*;
pub use response::*;
pub use routes::*;
pub use services::*;
pub use state::*;
pub use tokens::*;
