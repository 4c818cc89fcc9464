use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::dto::{
    CreateUserRequest, DeleteUserRequest, DeleteUserResponse, Empty, GetAllUsersResponse,
    GetUserRequest, LoginRequest, LoginResponse, RpcError, RpcRequest, RpcResponse,
    UpdateUserRequest, JSONRPC_VERSION,
};
use crate::{auth::extractors::authorize, state::AppState, users::dto::UserResponse};

pub fn rpc_routes() -> Router<AppState> {
    Router::new().route("/rpc", post(handle))
}

/// Every call answers 200 with a JSON-RPC envelope; failures travel in `error`.
#[instrument(skip_all)]
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<RpcResponse> {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return Json(RpcResponse::failure(Value::Null, RpcError::parse_error())),
    };
    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return Json(RpcResponse::failure(
                Value::Null,
                RpcError::invalid_request(format!("invalid request: {e}")),
            ))
        }
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return Json(RpcResponse::failure(
            request.id,
            RpcError::invalid_request("jsonrpc must be \"2.0\""),
        ));
    }

    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    debug!(method = %request.method, "rpc call");
    let response = match dispatch(&state, auth, &request.method, request.params).await {
        Ok(result) => RpcResponse::success(request.id, result),
        Err(error) => RpcResponse::failure(request.id, error),
    };
    Json(response)
}

async fn dispatch(
    state: &AppState,
    auth: Option<&str>,
    method: &str,
    params: Value,
) -> Result<Value, RpcError> {
    let users = &state.users;
    match method {
        "CreateUser" => {
            let req: CreateUserRequest = decode(params)?;
            let user = users.create(req.into()).await?;
            encode(UserResponse::from(user))
        }
        "GetUser" => {
            let req: GetUserRequest = decode(params)?;
            let user = users.get_by_id(req.id).await?;
            encode(UserResponse::from(user))
        }
        "GetAllUsers" => {
            let _: Empty = decode(params)?;
            let all = users.get_all().await?;
            encode(GetAllUsersResponse {
                users: all.into_iter().map(UserResponse::from).collect(),
            })
        }
        "UpdateUser" => {
            let (id, input) = decode::<UpdateUserRequest>(params)?.into_parts();
            let user = users.update(id, input).await?;
            encode(UserResponse::from(user))
        }
        "DeleteUser" => {
            let req: DeleteUserRequest = decode(params)?;
            users.delete(req.id).await?;
            encode(DeleteUserResponse::default())
        }
        "Login" => {
            let req: LoginRequest = decode(params)?;
            let token = users.login(&req.email, &req.password).await?;
            encode(LoginResponse { token })
        }
        "GetCurrentUser" => {
            let _: Empty = decode(params)?;
            let identity = authorize(auth, &state.keys)?;
            let user = users.current_user(identity).await?;
            encode(UserResponse::from(user))
        }
        other => Err(RpcError::method_not_found(other)),
    }
}

fn decode<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    // Absent params mean an empty object.
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params(format!("invalid params: {e}")))
}

fn encode<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|_| RpcError::internal())
}
