//! services/api/src/web/testing.rs
//!
//! Test-only helpers: an `AppState` wired to inert stub stores. Tests swap
//! in their own stub for the store under test and leave the rest untouched;
//! touching an inert store panics, which catches unintended calls.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Level;
use uuid::Uuid;

use crate::config::Config;
use crate::web::state::AppState;
use farmacia_core::domain::{
    CambiosRol, Credenciales, Dashboard, Medicina, NuevaMedicina, NuevoRol, ReporteInventario,
    ResumenInventario, Rol, Usuario,
};
use farmacia_core::ports::{
    DashboardStore, FotoStore, InventarioStore, PortResult, ReporteStore, RolStore, UsuarioStore,
};

pub struct NoopInventario;

#[async_trait]
impl InventarioStore for NoopInventario {
    async fn find_all(&self) -> PortResult<Vec<Medicina>> {
        unimplemented!()
    }

    async fn find_by_id(&self, _id: Uuid) -> PortResult<Medicina> {
        unimplemented!()
    }

    async fn find_by_nombre(&self, _nombre: &str) -> PortResult<Medicina> {
        unimplemented!()
    }

    async fn insert(&self, _medicina: NuevaMedicina) -> PortResult<Medicina> {
        unimplemented!()
    }

    async fn insert_many(&self, _medicinas: Vec<NuevaMedicina>) -> PortResult<Vec<Medicina>> {
        unimplemented!()
    }

    async fn update(&self, _medicina: &Medicina) -> PortResult<Medicina> {
        unimplemented!()
    }

    async fn delete(&self, _id: Uuid) -> PortResult<Medicina> {
        unimplemented!()
    }
}

pub struct NoopReportes;

#[async_trait]
impl ReporteStore for NoopReportes {
    async fn insert(&self, _resumen: ResumenInventario) -> PortResult<ReporteInventario> {
        unimplemented!()
    }
}

pub struct NoopRoles;

#[async_trait]
impl RolStore for NoopRoles {
    async fn find_all(&self) -> PortResult<Vec<Rol>> {
        unimplemented!()
    }

    async fn find_by_id(&self, _id: Uuid) -> PortResult<Rol> {
        unimplemented!()
    }

    async fn insert(&self, _rol: NuevoRol) -> PortResult<Rol> {
        unimplemented!()
    }

    async fn update(&self, _id: Uuid, _cambios: CambiosRol) -> PortResult<Rol> {
        unimplemented!()
    }

    async fn delete(&self, _id: Uuid) -> PortResult<()> {
        unimplemented!()
    }
}

pub struct NoopUsuarios;

#[async_trait]
impl UsuarioStore for NoopUsuarios {
    async fn find_all(&self) -> PortResult<Vec<Usuario>> {
        unimplemented!()
    }

    async fn find_by_id(&self, _id: Uuid) -> PortResult<Usuario> {
        unimplemented!()
    }

    async fn find_credenciales_by_name(&self, _name: &str) -> PortResult<Credenciales> {
        unimplemented!()
    }

    async fn insert(&self, _name: &str, _email: &str, _password_hash: &str) -> PortResult<Usuario> {
        unimplemented!()
    }

    async fn update(
        &self,
        _id: Uuid,
        _name: Option<&str>,
        _email: Option<&str>,
    ) -> PortResult<Usuario> {
        unimplemented!()
    }

    async fn delete(&self, _id: Uuid) -> PortResult<()> {
        unimplemented!()
    }

    async fn assign_rol(&self, _user_id: Uuid, _rol_id: Uuid) -> PortResult<Usuario> {
        unimplemented!()
    }
}

pub struct NoopDashboard;

#[async_trait]
impl DashboardStore for NoopDashboard {
    async fn get(&self) -> PortResult<Dashboard> {
        unimplemented!()
    }

    async fn upsert(&self, _dashboard: Dashboard) -> PortResult<Dashboard> {
        unimplemented!()
    }

    async fn delete(&self) -> PortResult<()> {
        unimplemented!()
    }
}

pub struct NoopFotos;

#[async_trait]
impl FotoStore for NoopFotos {
    async fn save(&self, _original_name: &str, _data: &[u8]) -> PortResult<String> {
        unimplemented!()
    }

    async fn delete(&self, _filename: &str) -> PortResult<()> {
        unimplemented!()
    }
}

fn config_de_prueba() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().expect("valid bind address"),
        database_url: String::new(),
        log_level: Level::INFO,
        uploads_dir: PathBuf::from("."),
        cors_origin: "http://localhost:5173".to_string(),
    }
}

/// An `AppState` where every store is inert; swap in stubs as needed.
pub fn estado_de_prueba() -> AppState {
    AppState {
        config: Arc::new(config_de_prueba()),
        inventario: Arc::new(NoopInventario),
        reportes: Arc::new(NoopReportes),
        roles: Arc::new(NoopRoles),
        usuarios: Arc::new(NoopUsuarios),
        dashboard: Arc::new(NoopDashboard),
        fotos: Arc::new(NoopFotos),
    }
}
