pub mod client;
pub mod handlers;
pub mod mapping;

pub use handlers::router;
