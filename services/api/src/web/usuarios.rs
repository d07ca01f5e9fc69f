//! services/api/src/web/usuarios.rs
//!
//! Axum handlers for user administration and login. Passwords are hashed
//! with Argon2 on create and verified on login; the hash never appears in
//! any response.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::validate;
use farmacia_core::domain::Usuario;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolRequest {
    pub user_id: Uuid,
    pub rol_id: Uuid,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/users - List all users (password-free, role populated).
pub async fn get_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Usuario>>, ApiError> {
    Ok(Json(state.usuarios.find_all().await?))
}

/// GET /api/users/{id} - Fetch one user.
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Usuario>, ApiError> {
    Ok(Json(state.usuarios.find_by_id(id).await?))
}

/// POST /api/users - Register a user. Name and email must be unique.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Invalid field"),
        (status = 409, description = "Name or email already registered")
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate::validar_nombre_usuario(&req.name)?;
    validate::validar_email(&req.email)?;
    validate::validar_password(&req.password)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    let user = state
        .usuarios
        .insert(&req.name, &req.email, &password_hash)
        .await?;

    info!(usuario = %user.name, "Usuario creado");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Usuario creado correctamente",
            "user": { "id": user.id, "name": user.name, "email": user.email },
        })),
    ))
}

/// PUT /api/users/{id} - Update name and/or email only.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &req.name {
        validate::validar_nombre_usuario(name)?;
    }
    if let Some(email) = &req.email {
        validate::validar_email(email)?;
    }

    let user = state
        .usuarios
        .update(id, req.name.as_deref(), req.email.as_deref())
        .await?;

    Ok(Json(json!({ "message": "Usuario actualizado correctamente", "user": user })))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.usuarios.delete(id).await?;
    info!(%id, "Usuario eliminado");
    Ok(Json(json!({ "message": "Usuario eliminado correctamente" })))
}

/// POST /api/users/login - Verify name + password and return the user with
/// its role. There is no session storage; the frontend keeps the result.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let creds = state.usuarios.find_credenciales_by_name(&req.name).await?;

    let parsed_hash = PasswordHash::new(&creds.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Contraseña incorrecta" })),
        )
            .into_response());
    }

    info!(usuario = %creds.name, "Login exitoso");

    Ok(Json(json!({
        "success": true,
        "message": "Login correcto",
        "user": {
            "id": creds.id,
            "name": creds.name,
            "email": creds.email,
            "rol": creds.rol,
        },
    }))
    .into_response())
}

/// POST /api/users/assign-role - Point a user at a role.
pub async fn assign_rol(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignRolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.usuarios.assign_rol(req.user_id, req.rol_id).await?;

    let rol_name = user
        .rol
        .as_ref()
        .map(|r| r.name.clone())
        .unwrap_or_default();

    Ok(Json(json!({
        "message": format!("Rol '{}' asignado correctamente a '{}'", rol_name, user.name),
        "user": user,
    })))
}
