//! RPC transport: JSON-RPC 2.0 over `POST /rpc`, mirroring the REST surface
//! method for method.

use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod server;

pub fn router() -> Router<AppState> {
    server::rpc_routes()
}
