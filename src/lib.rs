//! IDEAL Platform - business networking front-end
//!
//! Server-rendered pages over the IDEAL backend REST API: listings,
//! expert profiles, events, documentation and an admin dashboard.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod models;
pub mod services;
pub mod views;
