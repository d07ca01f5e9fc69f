//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the store ports from the `farmacia_core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Uniqueness (role name, user name/email) is enforced by
//! unique indexes; the adapter maps unique-violation errors to
//! `PortError::Conflict` instead of checking first and inserting after.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use farmacia_core::domain::{
    CambiosRol, Card, Credenciales, Dashboard, DetalleReporte, Estado, Medicina, NuevaMedicina,
    NuevoRol, ReporteInventario, ResumenInventario, Rol, RolRef, Usuario,
};
use farmacia_core::ports::{
    DashboardStore, InventarioStore, PortError, PortResult, ReporteStore, RolStore, UsuarioStore,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every database-backed store port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Mapping Helpers
//=========================================================================================

fn storage_err(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

/// Maps a fetch error, turning `RowNotFound` into the given message.
fn not_found_err(e: sqlx::Error, mensaje: &str) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(mensaje.to_string()),
        otro => storage_err(otro),
    }
}

/// Maps an insert/update error, turning unique-index violations into the
/// given conflict message.
fn conflict_err(e: sqlx::Error, mensaje: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(mensaje.to_string())
        }
        _ => storage_err(e),
    }
}

/// User rows carry two unique indexes; pick the message for whichever one
/// was violated.
fn usuario_conflict_err(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let mensaje = match db.constraint() {
                Some("usuarios_email_idx") => "El email ya está registrado",
                _ => "El nombre ya está registrado",
            };
            PortError::Conflict(mensaje.to_string())
        }
        _ => storage_err(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct MedicinaRecord {
    id: Uuid,
    nombre: String,
    descripcion: String,
    foto: Option<String>,
    fecha_compra: NaiveDate,
    fecha_caducidad: NaiveDate,
    cantidad: i32,
    proveedor: String,
    precio: f64,
    precio_por_unidad: f64,
    estado: String,
    created_at: DateTime<Utc>,
}

impl MedicinaRecord {
    fn to_domain(self) -> Medicina {
        Medicina {
            id: self.id,
            nombre: self.nombre,
            descripcion: self.descripcion,
            foto: self.foto.filter(|f| !f.is_empty()),
            fecha_compra: self.fecha_compra,
            fecha_caducidad: self.fecha_caducidad,
            cantidad: self.cantidad,
            proveedor: self.proveedor,
            precio: self.precio,
            precio_por_unidad: self.precio_por_unidad,
            // Stored statuses are re-derived at every touchpoint anyway.
            estado: Estado::parse(&self.estado).unwrap_or(Estado::Disponible),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct RolRecord {
    id: Uuid,
    name: String,
    description: String,
    is_admin: bool,
    default_route: String,
    created_at: DateTime<Utc>,
}

impl RolRecord {
    fn to_domain(self) -> Rol {
        Rol {
            id: self.id,
            name: self.name,
            description: self.description,
            is_admin: self.is_admin,
            default_route: self.default_route,
            created_at: self.created_at,
        }
    }
}

/// A user row joined against its optional role.
#[derive(FromRow)]
struct UsuarioRecord {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    rol_id: Option<Uuid>,
    rol_name: Option<String>,
    rol_description: Option<String>,
}

impl UsuarioRecord {
    fn rol_ref(rol_id: Option<Uuid>, name: Option<String>, description: Option<String>) -> Option<RolRef> {
        rol_id.map(|id| RolRef {
            id,
            name: name.unwrap_or_default(),
            description: description.unwrap_or_default(),
        })
    }

    fn to_domain(self) -> Usuario {
        Usuario {
            id: self.id,
            name: self.name,
            email: self.email,
            rol: Self::rol_ref(self.rol_id, self.rol_name, self.rol_description),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredencialesRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    rol_id: Option<Uuid>,
    rol_name: Option<String>,
    rol_description: Option<String>,
}

impl CredencialesRecord {
    fn to_domain(self) -> Credenciales {
        Credenciales {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            rol: UsuarioRecord::rol_ref(self.rol_id, self.rol_name, self.rol_description),
        }
    }
}

#[derive(FromRow)]
struct DashboardRecord {
    id: Uuid,
    name: String,
    description: String,
    cards: Json<Vec<Card>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DashboardRecord {
    fn to_domain(self) -> Dashboard {
        Dashboard {
            id: self.id,
            name: self.name,
            description: self.description,
            cards: self.cards.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ReporteRecord {
    id: Uuid,
    tipo: String,
    total_medicinas: i64,
    disponibles: i64,
    agotadas: i64,
    caducadas: i64,
    valor_total_inventario: f64,
    detalle: Json<DetalleReporte>,
    fecha_generado: DateTime<Utc>,
}

impl ReporteRecord {
    fn to_domain(self) -> ReporteInventario {
        ReporteInventario {
            id: self.id,
            tipo: self.tipo,
            total_medicinas: self.total_medicinas,
            disponibles: self.disponibles,
            agotadas: self.agotadas,
            caducadas: self.caducadas,
            valor_total_inventario: self.valor_total_inventario,
            detalle: self.detalle.0,
            fecha_generado: self.fecha_generado,
        }
    }
}

//=========================================================================================
// Shared Query Fragments
//=========================================================================================

const MEDICINA_COLUMNS: &str = "id, nombre, descripcion, foto, fecha_compra, fecha_caducidad, \
     cantidad, proveedor, precio, precio_por_unidad, estado, created_at";

const USUARIO_JOIN: &str = "SELECT u.id, u.name, u.email, u.created_at, \
     r.id AS rol_id, r.name AS rol_name, r.description AS rol_description \
     FROM usuarios u LEFT JOIN roles r ON u.rol_id = r.id";

//=========================================================================================
// `InventarioStore` Implementation
//=========================================================================================

#[async_trait]
impl InventarioStore for DbAdapter {
    async fn find_all(&self) -> PortResult<Vec<Medicina>> {
        let records = sqlx::query_as::<_, MedicinaRecord>(&format!(
            "SELECT {MEDICINA_COLUMNS} FROM inventario_medicinas ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Medicina> {
        let record = sqlx::query_as::<_, MedicinaRecord>(&format!(
            "SELECT {MEDICINA_COLUMNS} FROM inventario_medicinas WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_err(e, "Medicina no encontrada"))?;

        Ok(record.to_domain())
    }

    async fn find_by_nombre(&self, nombre: &str) -> PortResult<Medicina> {
        let record = sqlx::query_as::<_, MedicinaRecord>(&format!(
            "SELECT {MEDICINA_COLUMNS} FROM inventario_medicinas WHERE nombre = $1 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(nombre)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_err(e, "Medicina no encontrada"))?;

        Ok(record.to_domain())
    }

    async fn insert(&self, medicina: NuevaMedicina) -> PortResult<Medicina> {
        let record = sqlx::query_as::<_, MedicinaRecord>(&format!(
            "INSERT INTO inventario_medicinas \
             (id, nombre, descripcion, foto, fecha_compra, fecha_caducidad, cantidad, \
              proveedor, precio, precio_por_unidad, estado) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {MEDICINA_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&medicina.nombre)
        .bind(&medicina.descripcion)
        .bind(&medicina.foto)
        .bind(medicina.fecha_compra)
        .bind(medicina.fecha_caducidad)
        .bind(medicina.cantidad)
        .bind(&medicina.proveedor)
        .bind(medicina.precio)
        .bind(medicina.precio_por_unidad)
        .bind(medicina.estado.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(record.to_domain())
    }

    async fn insert_many(&self, medicinas: Vec<NuevaMedicina>) -> PortResult<Vec<Medicina>> {
        // All-or-nothing: a batch either lands completely or not at all.
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let mut insertadas = Vec::with_capacity(medicinas.len());

        for medicina in medicinas {
            let record = sqlx::query_as::<_, MedicinaRecord>(&format!(
                "INSERT INTO inventario_medicinas \
                 (id, nombre, descripcion, foto, fecha_compra, fecha_caducidad, cantidad, \
                  proveedor, precio, precio_por_unidad, estado) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                 RETURNING {MEDICINA_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(&medicina.nombre)
            .bind(&medicina.descripcion)
            .bind(&medicina.foto)
            .bind(medicina.fecha_compra)
            .bind(medicina.fecha_caducidad)
            .bind(medicina.cantidad)
            .bind(&medicina.proveedor)
            .bind(medicina.precio)
            .bind(medicina.precio_por_unidad)
            .bind(medicina.estado.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_err)?;

            insertadas.push(record.to_domain());
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(insertadas)
    }

    async fn update(&self, medicina: &Medicina) -> PortResult<Medicina> {
        let record = sqlx::query_as::<_, MedicinaRecord>(&format!(
            "UPDATE inventario_medicinas SET \
             nombre = $2, descripcion = $3, foto = $4, fecha_compra = $5, \
             fecha_caducidad = $6, cantidad = $7, proveedor = $8, precio = $9, \
             precio_por_unidad = $10, estado = $11 \
             WHERE id = $1 RETURNING {MEDICINA_COLUMNS}"
        ))
        .bind(medicina.id)
        .bind(&medicina.nombre)
        .bind(&medicina.descripcion)
        .bind(&medicina.foto)
        .bind(medicina.fecha_compra)
        .bind(medicina.fecha_caducidad)
        .bind(medicina.cantidad)
        .bind(&medicina.proveedor)
        .bind(medicina.precio)
        .bind(medicina.precio_por_unidad)
        .bind(medicina.estado.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_err(e, "Medicina no encontrada"))?;

        Ok(record.to_domain())
    }

    async fn delete(&self, id: Uuid) -> PortResult<Medicina> {
        let record = sqlx::query_as::<_, MedicinaRecord>(&format!(
            "DELETE FROM inventario_medicinas WHERE id = $1 RETURNING {MEDICINA_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_err(e, "Medicina no encontrada"))?;

        Ok(record.to_domain())
    }
}

//=========================================================================================
// `ReporteStore` Implementation
//=========================================================================================

#[async_trait]
impl ReporteStore for DbAdapter {
    async fn insert(&self, resumen: ResumenInventario) -> PortResult<ReporteInventario> {
        let record = sqlx::query_as::<_, ReporteRecord>(
            "INSERT INTO reportes \
             (id, tipo, total_medicinas, disponibles, agotadas, caducadas, \
              valor_total_inventario, detalle) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, tipo, total_medicinas, disponibles, agotadas, caducadas, \
                       valor_total_inventario, detalle, fecha_generado",
        )
        .bind(Uuid::new_v4())
        .bind(&resumen.tipo)
        .bind(resumen.total_medicinas)
        .bind(resumen.disponibles)
        .bind(resumen.agotadas)
        .bind(resumen.caducadas)
        .bind(resumen.valor_total_inventario)
        .bind(Json(&resumen.detalle))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(record.to_domain())
    }
}

//=========================================================================================
// `RolStore` Implementation
//=========================================================================================

#[async_trait]
impl RolStore for DbAdapter {
    async fn find_all(&self) -> PortResult<Vec<Rol>> {
        let records = sqlx::query_as::<_, RolRecord>(
            "SELECT id, name, description, is_admin, default_route, created_at \
             FROM roles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Rol> {
        let record = sqlx::query_as::<_, RolRecord>(
            "SELECT id, name, description, is_admin, default_route, created_at \
             FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_err(e, "Rol no encontrado"))?;

        Ok(record.to_domain())
    }

    async fn insert(&self, rol: NuevoRol) -> PortResult<Rol> {
        let record = sqlx::query_as::<_, RolRecord>(
            "INSERT INTO roles (id, name, description, is_admin, default_route) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, description, is_admin, default_route, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&rol.name)
        .bind(&rol.description)
        .bind(rol.is_admin)
        .bind(&rol.default_route)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_err(e, "El rol ya existe"))?;

        Ok(record.to_domain())
    }

    async fn update(&self, id: Uuid, cambios: CambiosRol) -> PortResult<Rol> {
        let record = sqlx::query_as::<_, RolRecord>(
            "UPDATE roles SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             is_admin = COALESCE($4, is_admin), \
             default_route = COALESCE($5, default_route) \
             WHERE id = $1 \
             RETURNING id, name, description, is_admin, default_route, created_at",
        )
        .bind(id)
        .bind(cambios.name)
        .bind(cambios.description)
        .bind(cambios.is_admin)
        .bind(cambios.default_route)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict("El rol ya existe".to_string())
            }
            _ => not_found_err(e, "Rol no encontrado"),
        })?;

        Ok(record.to_domain())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Rol no encontrado".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// `UsuarioStore` Implementation
//=========================================================================================

#[async_trait]
impl UsuarioStore for DbAdapter {
    async fn find_all(&self) -> PortResult<Vec<Usuario>> {
        let records =
            sqlx::query_as::<_, UsuarioRecord>(&format!("{USUARIO_JOIN} ORDER BY u.created_at DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Usuario> {
        let record = sqlx::query_as::<_, UsuarioRecord>(&format!("{USUARIO_JOIN} WHERE u.id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_err(e, "Usuario no encontrado"))?;

        Ok(record.to_domain())
    }

    async fn find_credenciales_by_name(&self, name: &str) -> PortResult<Credenciales> {
        let record = sqlx::query_as::<_, CredencialesRecord>(
            "SELECT u.id, u.name, u.email, u.password_hash, \
             r.id AS rol_id, r.name AS rol_name, r.description AS rol_description \
             FROM usuarios u LEFT JOIN roles r ON u.rol_id = r.id \
             WHERE u.name = $1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_err(e, "Usuario no encontrado"))?;

        Ok(record.to_domain())
    }

    async fn insert(&self, name: &str, email: &str, password_hash: &str) -> PortResult<Usuario> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO usuarios (id, name, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(usuario_conflict_err)?;

        UsuarioStore::find_by_id(self, id).await
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> PortResult<Usuario> {
        let result = sqlx::query(
            "UPDATE usuarios SET name = COALESCE($2, name), email = COALESCE($3, email) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(usuario_conflict_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Usuario no encontrado".to_string()));
        }
        UsuarioStore::find_by_id(self, id).await
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Usuario no encontrado".to_string()));
        }
        Ok(())
    }

    async fn assign_rol(&self, user_id: Uuid, rol_id: Uuid) -> PortResult<Usuario> {
        let result = sqlx::query("UPDATE usuarios SET rol_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(rol_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    PortError::NotFound("Rol no encontrado".to_string())
                }
                _ => storage_err(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Usuario no encontrado".to_string()));
        }
        UsuarioStore::find_by_id(self, user_id).await
    }
}

//=========================================================================================
// `DashboardStore` Implementation
//=========================================================================================

#[async_trait]
impl DashboardStore for DbAdapter {
    async fn get(&self) -> PortResult<Dashboard> {
        let record = sqlx::query_as::<_, DashboardRecord>(
            "SELECT id, name, description, cards, created_at, updated_at \
             FROM dashboards LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match record {
            Some(r) => Ok(r.to_domain()),
            None => Err(PortError::NotFound("No hay dashboard creado aún".to_string())),
        }
    }

    async fn upsert(&self, dashboard: Dashboard) -> PortResult<Dashboard> {
        // Single-row table keyed by the always-true `singleton` column, so
        // create-or-update collapses into one statement.
        let record = sqlx::query_as::<_, DashboardRecord>(
            "INSERT INTO dashboards (id, name, description, cards) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (singleton) DO UPDATE SET \
               name = EXCLUDED.name, \
               description = EXCLUDED.description, \
               cards = EXCLUDED.cards, \
               updated_at = NOW() \
             RETURNING id, name, description, cards, created_at, updated_at",
        )
        .bind(dashboard.id)
        .bind(&dashboard.name)
        .bind(&dashboard.description)
        .bind(Json(&dashboard.cards))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(record.to_domain())
    }

    async fn delete(&self) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM dashboards")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(
                "No hay dashboard para eliminar".to_string(),
            ));
        }
        Ok(())
    }
}
