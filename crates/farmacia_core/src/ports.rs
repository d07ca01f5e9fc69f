//! crates/farmacia_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or disks.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    CambiosRol, Credenciales, Dashboard, Medicina, NuevaMedicina, NuevoRol, ReporteInventario,
    ResumenInventario, Rol, Usuario,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The variants mirror the request-level error taxonomy: bad input, missing
/// entity, duplicate unique field, and underlying storage failure. Every
/// error is terminal for its request; there are no retries.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Medicine inventory records, newest first.
#[async_trait]
pub trait InventarioStore: Send + Sync {
    async fn find_all(&self) -> PortResult<Vec<Medicina>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Medicina>;

    async fn find_by_nombre(&self, nombre: &str) -> PortResult<Medicina>;

    async fn insert(&self, medicina: NuevaMedicina) -> PortResult<Medicina>;

    async fn insert_many(&self, medicinas: Vec<NuevaMedicina>) -> PortResult<Vec<Medicina>>;

    /// Persists the full record as given; callers merge fields and re-derive
    /// `estado`/`precio_por_unidad` beforehand.
    async fn update(&self, medicina: &Medicina) -> PortResult<Medicina>;

    /// Returns the deleted record so the caller can clean up its photo asset.
    async fn delete(&self, id: Uuid) -> PortResult<Medicina>;
}

/// Append-only report snapshots.
#[async_trait]
pub trait ReporteStore: Send + Sync {
    async fn insert(&self, resumen: ResumenInventario) -> PortResult<ReporteInventario>;
}

#[async_trait]
pub trait RolStore: Send + Sync {
    async fn find_all(&self) -> PortResult<Vec<Rol>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Rol>;

    async fn insert(&self, rol: NuevoRol) -> PortResult<Rol>;

    async fn update(&self, id: Uuid, cambios: CambiosRol) -> PortResult<Rol>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait UsuarioStore: Send + Sync {
    async fn find_all(&self) -> PortResult<Vec<Usuario>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Usuario>;

    /// Login lookup; the only read that surfaces the password hash.
    async fn find_credenciales_by_name(&self, name: &str) -> PortResult<Credenciales>;

    async fn insert(&self, name: &str, email: &str, password_hash: &str) -> PortResult<Usuario>;

    async fn update(&self, id: Uuid, name: Option<&str>, email: Option<&str>)
        -> PortResult<Usuario>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;

    async fn assign_rol(&self, user_id: Uuid, rol_id: Uuid) -> PortResult<Usuario>;
}

/// The dashboard singleton. `get` fails with `NotFound` when none exists;
/// `upsert` creates or replaces the single document atomically.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn get(&self) -> PortResult<Dashboard>;

    async fn upsert(&self, dashboard: Dashboard) -> PortResult<Dashboard>;

    async fn delete(&self) -> PortResult<()>;
}

/// Stored photo assets for inventory items.
#[async_trait]
pub trait FotoStore: Send + Sync {
    /// Stores the image bytes and returns the filename to persist on the item.
    async fn save(&self, original_name: &str, data: &[u8]) -> PortResult<String>;

    /// Removes a stored photo. Deleting a file that no longer exists is not
    /// an error.
    async fn delete(&self, filename: &str) -> PortResult<()>;
}
