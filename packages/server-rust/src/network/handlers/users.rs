//! User-roster endpoint handlers.
//!
//! Thin glue between the router and the registry. Each handler wraps its
//! registry call in [`instrumented`], which produces the START/END/ERROR
//! records for the operation; the handlers themselves do no logging.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::error::AppError;
use crate::observability::instrumented;
use crate::service::ServiceError;

/// Component name stamped on this module's method records.
const COMPONENT: &str = "UserService";

/// Query parameter carrying the user name for add/remove.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

/// `GET /addUser?name=<name>` — registers a name.
pub async fn add_user_handler(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<StatusCode, AppError> {
    instrumented(COMPONENT, "add_user", async {
        state.users.add(query.name);
        Ok::<(), ServiceError>(())
    })
    .await?;
    Ok(StatusCode::OK)
}

/// `GET /removeUser?name=<name>` — removes a name.
pub async fn remove_user_handler(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<StatusCode, AppError> {
    instrumented(COMPONENT, "remove_user", async {
        state.users.remove(&query.name);
        Ok::<(), ServiceError>(())
    })
    .await?;
    Ok(StatusCode::OK)
}

/// `GET /getUsers` — returns all registered names, sorted.
pub async fn get_users_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let users = instrumented(COMPONENT, "get_users", async {
        Ok::<_, ServiceError>(state.users.list())
    })
    .await?;
    Ok(Json(users))
}

/// `GET /fireException` — always fails, demonstrating how a raised business
/// error travels through instrumentation and surfaces as a 500.
pub async fn fire_exception_handler(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    instrumented(COMPONENT, "fire_exception", async {
        state.users.fire_exception()
    })
    .await?;
    Ok(StatusCode::OK)
}
