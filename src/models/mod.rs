//! Data models

pub mod activity;
pub mod asset;
pub mod audit;
pub mod auth;
pub mod report;
pub mod user;
