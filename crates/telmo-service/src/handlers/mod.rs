//! HTTP request handlers.

pub mod admin;
pub mod balance;
pub mod health;
pub mod subscriptions;
pub mod transfers;
