//! Mesa de Partes Virtual server library.
//!
//! Citizen document intake with email verification, case numbering and
//! lookup, plus the administrator movement log.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
