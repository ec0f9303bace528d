mod handlers;
mod middleware;
mod routes;
mod session;

pub use routes::create_router;
