//! Library crate for scorecard-back, exposing modules for binaries and integration tests.

pub mod auth;
pub mod config;
pub mod dao;
mod dto;
mod error;
pub mod routes;
pub mod scorecard;
pub mod services;
pub mod state;
