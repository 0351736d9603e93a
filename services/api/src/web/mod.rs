pub mod auth;
pub mod books;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod rest;
pub mod reviews;
pub mod state;
pub mod token;
pub mod users;

// Re-export the pieces the binary needs to build the router.
pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;
