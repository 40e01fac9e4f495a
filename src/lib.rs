//! ICT hardware asset register
//!
//! Tracks the full lifecycle of ministry ICT equipment: registration,
//! assignment, movement between provinces and districts, loss, repair,
//! archival and auction. Every change lands in an append-only activity
//! ledger that feeds the movement report.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod locations;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
