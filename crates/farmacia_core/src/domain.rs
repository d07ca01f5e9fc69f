//! crates/farmacia_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework; the
//! serde derives only fix the wire field names the frontend expects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived lifecycle state of an inventory item. Never client-settable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Estado {
    Disponible,
    Agotado,
    Caducado,
}

impl Estado {
    pub fn as_str(&self) -> &'static str {
        match self {
            Estado::Disponible => "Disponible",
            Estado::Agotado => "Agotado",
            Estado::Caducado => "Caducado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Disponible" => Some(Estado::Disponible),
            "Agotado" => Some(Estado::Agotado),
            "Caducado" => Some(Estado::Caducado),
            _ => None,
        }
    }
}

/// A medicine inventory record.
///
/// `estado` and `precio_por_unidad` are derived fields: they are recomputed
/// from the other fields before every persist and before every report run
/// (see [`crate::report`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicina {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: String,
    pub foto: Option<String>,
    pub fecha_compra: NaiveDate,
    pub fecha_caducidad: NaiveDate,
    pub cantidad: i32,
    pub proveedor: String,
    pub precio: f64,
    pub precio_por_unidad: f64,
    pub estado: Estado,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a medicine. `estado` and `precio_por_unidad` must
/// already be derived by the caller before the record is persisted.
#[derive(Debug, Clone)]
pub struct NuevaMedicina {
    pub nombre: String,
    pub descripcion: String,
    pub foto: Option<String>,
    pub fecha_compra: NaiveDate,
    pub fecha_caducidad: NaiveDate,
    pub cantidad: i32,
    pub proveedor: String,
    pub precio: f64,
    pub precio_por_unidad: f64,
    pub estado: Estado,
}

/// A role referenced by users and by dashboard card permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rol {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_admin: bool,
    pub default_route: String,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a role.
#[derive(Debug, Clone)]
pub struct NuevoRol {
    pub name: String,
    pub description: String,
    pub is_admin: bool,
    pub default_route: String,
}

/// Partial update for a role; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CambiosRol {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_admin: Option<bool>,
    pub default_route: Option<String>,
}

/// The populated role reference returned alongside a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolRef {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

// Represents a user as returned by reads: the password hash never leaves
// the credentials struct below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub rol: Option<RolRef>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data.
#[derive(Debug, Clone)]
pub struct Credenciales {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub rol: Option<RolRef>,
}

/// Grid position of a dashboard card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Posicion {
    pub row: i32,
    pub col: i32,
}

/// Grid size of a dashboard card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tamano {
    pub width: i32,
    pub height: i32,
}

impl Default for Tamano {
    fn default() -> Self {
        Self { width: 4, height: 1 }
    }
}

/// One card inside the dashboard singleton. Each card keeps a stable id so
/// nested updates and deletes can address it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub description: String,
    pub path: String,
    pub component: String,
    pub position: Posicion,
    pub size: Tamano,
    /// Role ids allowed to see this card.
    pub permissions: Vec<Uuid>,
    pub is_active: bool,
}

/// The dashboard configuration. At most one exists system-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report type discriminator used by every inventory snapshot.
pub const TIPO_INVENTARIO: &str = "inventario";

/// Name/price pair for the most-expensive ranking inside the report detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicinaCostosa {
    pub nombre: String,
    pub precio: f64,
}

/// Nested detail block of an inventory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetalleReporte {
    pub top_costosas: Vec<MedicinaCostosa>,
    pub total_con_cantidad: i64,
}

/// The figures of one aggregation run, before persistence. The snapshot
/// store turns this into a [`ReporteInventario`] with an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumenInventario {
    pub tipo: String,
    pub total_medicinas: i64,
    pub disponibles: i64,
    pub agotadas: i64,
    pub caducadas: i64,
    pub valor_total_inventario: f64,
    pub detalle: DetalleReporte,
}

impl ResumenInventario {
    /// The all-zero snapshot returned when the inventory is empty.
    pub fn vacio() -> Self {
        Self {
            tipo: TIPO_INVENTARIO.to_string(),
            total_medicinas: 0,
            disponibles: 0,
            agotadas: 0,
            caducadas: 0,
            valor_total_inventario: 0.0,
            detalle: DetalleReporte {
                top_costosas: Vec::new(),
                total_con_cantidad: 0,
            },
        }
    }
}

/// One persisted result of running the report aggregation. Append-only:
/// snapshots are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporteInventario {
    pub id: Uuid,
    pub tipo: String,
    pub total_medicinas: i64,
    pub disponibles: i64,
    pub agotadas: i64,
    pub caducadas: i64,
    pub valor_total_inventario: f64,
    pub detalle: DetalleReporte,
    pub fecha_generado: DateTime<Utc>,
}
