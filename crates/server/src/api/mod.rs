pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod routes;

pub use routes::create_router;
