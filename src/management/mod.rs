mod auth;
mod store;

pub use auth::REFRESH_BUFFER_MINUTES;
pub use auth::TokenManager;
pub use store::TokenStore;
