//! services/api/src/web/roles.rs
//!
//! Axum handlers for role administration.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::validate;
use farmacia_core::domain::{CambiosRol, NuevoRol, Rol};

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_admin: bool,
    pub default_route: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_admin: Option<bool>,
    pub default_route: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/roles - List all roles, newest first.
#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "List of roles"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_roles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Rol>>, ApiError> {
    Ok(Json(state.roles.find_all().await?))
}

/// GET /api/roles/{id} - Fetch one role.
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    responses(
        (status = 200, description = "The role"),
        (status = 404, description = "Role not found")
    ),
    params(("id" = Uuid, Path, description = "Role id"))
)]
pub async fn get_rol_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Rol>, ApiError> {
    Ok(Json(state.roles.find_by_id(id).await?))
}

/// POST /api/roles - Create a role. A duplicate name is a conflict.
#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRolRequest,
    responses(
        (status = 201, description = "Role created"),
        (status = 400, description = "Invalid field"),
        (status = 409, description = "Role name already exists")
    )
)]
pub async fn create_rol(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let default_route = req
        .default_route
        .unwrap_or_else(|| "/dashboard".to_string());

    validate::validar_nombre_rol(&req.name)?;
    validate::validar_descripcion_rol(&req.description)?;
    validate::validar_default_route(&default_route)?;

    let rol = state
        .roles
        .insert(NuevoRol {
            name: req.name,
            description: req.description,
            is_admin: req.is_admin,
            default_route,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Rol creado correctamente", "rol": rol })),
    ))
}

/// PUT /api/roles/{id} - Partial update; absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    request_body = UpdateRolRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already exists")
    ),
    params(("id" = Uuid, Path, description = "Role id"))
)]
pub async fn update_rol(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &req.name {
        validate::validar_nombre_rol(name)?;
    }
    if let Some(description) = &req.description {
        validate::validar_descripcion_rol(description)?;
    }
    if let Some(route) = &req.default_route {
        validate::validar_default_route(route)?;
    }

    let rol = state
        .roles
        .update(
            id,
            CambiosRol {
                name: req.name,
                description: req.description,
                is_admin: req.is_admin,
                default_route: req.default_route,
            },
        )
        .await?;

    Ok(Json(json!({ "message": "Rol actualizado correctamente", "rol": rol })))
}

/// DELETE /api/roles/{id} - Remove a role. Users pointing at it lose the
/// reference; dashboard card permission lists are not cleaned up.
#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    responses(
        (status = 200, description = "Role deleted"),
        (status = 404, description = "Role not found")
    ),
    params(("id" = Uuid, Path, description = "Role id"))
)]
pub async fn delete_rol(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.roles.delete(id).await?;
    Ok(Json(json!({ "message": "Rol eliminado correctamente" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::testing;
    use async_trait::async_trait;
    use farmacia_core::ports::{PortError, PortResult, RolStore};

    /// Mimics the unique index on the role name rejecting a duplicate.
    struct RolesDuplicados;

    #[async_trait]
    impl RolStore for RolesDuplicados {
        async fn find_all(&self) -> PortResult<Vec<Rol>> {
            unimplemented!()
        }

        async fn find_by_id(&self, _id: Uuid) -> PortResult<Rol> {
            unimplemented!()
        }

        async fn insert(&self, _rol: NuevoRol) -> PortResult<Rol> {
            Err(PortError::Conflict("El rol ya existe".to_string()))
        }

        async fn update(&self, _id: Uuid, _cambios: CambiosRol) -> PortResult<Rol> {
            unimplemented!()
        }

        async fn delete(&self, _id: Uuid) -> PortResult<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn crear_un_rol_duplicado_responde_409() {
        let mut estado = testing::estado_de_prueba();
        estado.roles = Arc::new(RolesDuplicados);

        let resultado = create_rol(
            State(Arc::new(estado)),
            Json(CreateRolRequest {
                name: "Administrador".to_string(),
                description: String::new(),
                is_admin: true,
                default_route: None,
            }),
        )
        .await;

        let error = match resultado {
            Err(e) => e,
            Ok(_) => panic!("a duplicate role name must be rejected"),
        };
        let respuesta = error.into_response();
        assert_eq!(respuesta.status(), StatusCode::CONFLICT);
    }
}
