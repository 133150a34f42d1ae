pub mod auth;
pub mod customer;
pub mod notification;
pub mod property;
pub mod report;
pub mod source;
pub mod visit;
