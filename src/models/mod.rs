pub mod comment;
pub mod thread;
pub mod user;
pub mod vote;

use serde::Deserialize;

pub use comment::*;
pub use thread::*;
pub use user::*;
pub use vote::*;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}
