//! HTTP handlers

pub mod asset;
pub mod audit;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod report;
pub mod user;
