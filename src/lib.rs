//! Library exports for kindergate, shared between the binary and tests.

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod poller;
pub mod refresh;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;
