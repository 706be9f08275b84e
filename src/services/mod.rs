pub mod comment_service;
pub mod thread_service;
pub mod user_service;
pub mod vote_service;
