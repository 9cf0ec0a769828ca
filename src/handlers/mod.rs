pub mod answers;
pub mod auth;
pub mod comments;
pub mod questions;
pub mod tags;
pub mod users;
