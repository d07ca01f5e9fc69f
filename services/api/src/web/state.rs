//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use farmacia_core::ports::{
    DashboardStore, FotoStore, InventarioStore, ReporteStore, RolStore, UsuarioStore,
};

/// The shared application state, created once at startup and passed to all handlers.
///
/// Each store is a trait object so handlers can be exercised against
/// in-memory stubs in tests; in production every database-backed handle
/// points at the same `DbAdapter`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub inventario: Arc<dyn InventarioStore>,
    pub reportes: Arc<dyn ReporteStore>,
    pub roles: Arc<dyn RolStore>,
    pub usuarios: Arc<dyn UsuarioStore>,
    pub dashboard: Arc<dyn DashboardStore>,
    pub fotos: Arc<dyn FotoStore>,
}
