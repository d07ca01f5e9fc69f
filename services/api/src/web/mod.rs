//! services/api/src/web/mod.rs
//!
//! Axum handler modules, one per resource, plus the master definition for
//! the OpenAPI specification.

pub mod dashboard;
pub mod inventario;
pub mod reportes;
pub mod roles;
pub mod state;
#[cfg(test)]
pub mod testing;
pub mod usuarios;
pub mod validate;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        roles::get_roles,
        roles::get_rol_by_id,
        roles::create_rol,
        roles::update_rol,
        roles::delete_rol,
        usuarios::create_user,
        usuarios::login,
        dashboard::get_dashboard,
        inventario::get_medicinas,
        inventario::create_medicina,
        reportes::get_reporte_inventario,
    ),
    components(
        schemas(
            roles::CreateRolRequest,
            roles::UpdateRolRequest,
            usuarios::CreateUserRequest,
            usuarios::LoginRequest,
            reportes::ReporteBody,
            reportes::RespuestaReporte,
        )
    ),
    tags(
        (name = "Inventario de Medicinas API", description = "Endpoints de administración de la farmacia: usuarios, roles, dashboard, inventario y reportes.")
    )
)]
pub struct ApiDoc;

/// GET /api - Liveness probe.
pub async fn health() -> &'static str {
    "API del Inventario de Medicinas funcionando correctamente"
}
