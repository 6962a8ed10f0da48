pub mod auth;
pub mod token;

pub use auth::AuthCommands;
pub use token::TokenCommands;
