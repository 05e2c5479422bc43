pub mod attachment;
pub mod chat;
pub mod user;
