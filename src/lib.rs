//! Life tracker backend: game store, hold-to-repeat counters and the display's HTTP surface.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
