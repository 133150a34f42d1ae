pub mod auth;
pub mod customers;
pub mod notifications;
pub mod properties;
pub mod reports;
pub mod sources;
pub mod upload;
pub mod visits;
