pub mod auth;
pub mod domain;
pub mod ports;
pub mod stats;

pub use auth::{AuthContext, GateError};
pub use domain::{
    Book, BookFilter, NewBook, NewReview, NewUser, Review, ReviewWithAuthor, ReviewWithBook, User,
    UserStats, ValidationError,
};
pub use ports::{CatalogStore, ReviewStore, StoreError, StoreResult, UserStore};
