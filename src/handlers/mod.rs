pub mod auth;
pub mod comments;
pub mod health;
pub mod threads;
pub mod users;
