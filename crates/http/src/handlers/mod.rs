pub mod chat;
pub mod database;
pub mod schemas;
