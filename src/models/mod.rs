pub mod answer;
pub mod comment;
pub mod question;
pub mod tag;
pub mod user;
pub mod vote;

pub use answer::*;
pub use comment::*;
pub use question::*;
pub use tag::*;
pub use user::*;
pub use vote::*;
