//! User-account service: one identity core served over REST and JSON-RPC.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod rpc;
pub mod state;
pub mod users;
