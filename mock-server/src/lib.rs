//! In-memory stand-in for the helpdesk users API.
//!
//! Serves the same paths the client builds (`/users`, `/users/{id}`,
//! `/users/current`, `/users/{id}/user_identities`) with the same envelopes
//! (`{"user": ..}`, `{"users": [..]}`, `{"identities": [..]}`). The
//! "current" user is the lowest id in the store.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
}

#[derive(Deserialize, Default)]
pub struct UserFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub organization_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct UserPayload {
    pub user: UserFields,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub query: Option<String>,
    pub per_page: Option<usize>,
    pub page: Option<usize>,
}

#[derive(Default)]
pub struct Store {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

const DEFAULT_PER_PAGE: usize = 100;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/current", get(current_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/user_identities", get(list_identities))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn invalid(description: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"error": "RecordInvalid", "description": description})),
    )
}

async fn list_users(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Value> {
    let store = db.read().await;
    let needle = params.query.as_deref().map(str::to_lowercase);
    let matches: Vec<&User> = store
        .users
        .values()
        .filter(|u| match &needle {
            None => true,
            Some(n) => {
                u.name.to_lowercase().contains(n)
                    || u.email.as_deref().is_some_and(|e| e.to_lowercase().contains(n))
            }
        })
        .collect();

    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let users: Vec<&User> = matches
        .iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .copied()
        .collect();
    let next_page = (page.saturating_mul(per_page) < matches.len())
        .then(|| format!("/users?page={}", page.saturating_add(1)));

    Json(json!({
        "users": users,
        "count": matches.len(),
        "next_page": next_page,
    }))
}

async fn create_user(
    State(db): State<Db>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let fields = payload.user;
    let name = match fields.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(invalid("Name: cannot be blank")),
    };

    let mut store = db.write().await;
    store.next_id += 1;
    let user = User {
        id: store.next_id,
        name,
        email: fields.email,
        role: fields.role.unwrap_or_else(|| "end_user".to_string()),
        phone: fields.phone,
        organization_id: fields.organization_id,
    };
    store.users.insert(user.id, user.clone());
    info!(id = user.id, "created user");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .users
        .get(&id)
        .map(|user| Json(json!({ "user": user })))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn current_user(State(db): State<Db>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .users
        .values()
        .next()
        .map(|user| Json(json!({ "user": user })))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut store = db.write().await;
    let user = store
        .users
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, Json(json!({"error": "RecordNotFound"}))))?;
    let fields = payload.user;
    if let Some(name) = fields.name {
        if name.trim().is_empty() {
            return Err(invalid("Name: cannot be blank"));
        }
        user.name = name;
    }
    if let Some(email) = fields.email {
        user.email = Some(email);
    }
    if let Some(role) = fields.role {
        user.role = role;
    }
    if let Some(phone) = fields.phone {
        user.phone = Some(phone);
    }
    if let Some(org) = fields.organization_id {
        user.organization_id = Some(org);
    }
    Ok(Json(json!({ "user": user })))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut store = db.write().await;
    match store.users.remove(&id) {
        Some(_) => {
            info!(id, "deleted user");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn list_identities(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let user = store.users.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let identities: Vec<Value> = user
        .email
        .iter()
        .map(|email| {
            json!({
                "id": user.id * 10 + 1,
                "user_id": user.id,
                "type": "email",
                "value": email,
                "verified": true,
                "primary": true,
            })
        })
        .collect();
    Ok(Json(json!({ "identities": identities })))
}
