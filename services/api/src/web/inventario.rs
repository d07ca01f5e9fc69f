//! services/api/src/web/inventario.rs
//!
//! Axum handlers for the medicine inventory. Create and single update are
//! multipart (the photo travels with the fields); batch insert and bulk
//! update are plain JSON. `estado` and `precio_por_unidad` are re-derived
//! before every persist, never taken from the client.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::validate;
use farmacia_core::domain::{Medicina, NuevaMedicina};
use farmacia_core::ports::{PortError, PortResult};
use farmacia_core::report::{derivar_estado, derivar_precio_por_unidad};

/// Upload limits for medicine photos.
const MAX_FOTO_BYTES: usize = 5 * 1024 * 1024;
const MIMES_PERMITIDOS: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

const CAMPOS_OBLIGATORIOS: &str =
    "Los campos 'nombre', 'fecha_compra', 'fecha_caducidad' y 'precio' son obligatorios.";

//=========================================================================================
// Multipart Parsing
//=========================================================================================

struct FotoSubida {
    nombre: String,
    datos: Bytes,
}

/// The text fields plus the optional photo part of a multipart form.
#[derive(Default)]
struct CamposMedicina {
    textos: HashMap<String, String>,
    foto: Option<FotoSubida>,
}

fn multipart_invalido(e: axum::extract::multipart::MultipartError) -> PortError {
    PortError::Validation(format!("Formulario multipart inválido: {e}"))
}

async fn leer_multipart(mut multipart: Multipart) -> PortResult<CamposMedicina> {
    let mut campos = CamposMedicina::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_invalido)? {
        let nombre = match field.name() {
            Some(n) => n.to_string(),
            None => continue,
        };

        if nombre == "foto" {
            let content_type = field.content_type().map(str::to_string).unwrap_or_default();
            if !MIMES_PERMITIDOS.contains(&content_type.as_str()) {
                return Err(PortError::Validation(
                    "Solo se permiten imágenes (jpg, jpeg, png, webp).".to_string(),
                ));
            }
            let file_name = field.file_name().unwrap_or("foto").to_string();
            let datos = field.bytes().await.map_err(multipart_invalido)?;
            if datos.len() > MAX_FOTO_BYTES {
                return Err(PortError::Validation(
                    "El archivo excede el tamaño máximo permitido (5 MB).".to_string(),
                ));
            }
            campos.foto = Some(FotoSubida {
                nombre: file_name,
                datos,
            });
        } else {
            let valor = field.text().await.map_err(multipart_invalido)?;
            campos.textos.insert(nombre, valor);
        }
    }

    Ok(campos)
}

//=========================================================================================
// Field Parsing Helpers
//=========================================================================================

/// Accepts plain dates and full RFC 3339 timestamps, which is what the
/// frontend's date pickers send depending on the widget.
fn parsear_fecha(valor: &str, campo: &str) -> PortResult<NaiveDate> {
    if let Ok(fecha) = NaiveDate::parse_from_str(valor, "%Y-%m-%d") {
        return Ok(fecha);
    }
    DateTime::parse_from_rfc3339(valor)
        .map(|dt| dt.date_naive())
        .map_err(|_| PortError::Validation(format!("El campo '{campo}' no es una fecha válida")))
}

fn parsear_i32(valor: &str, campo: &str) -> PortResult<i32> {
    valor
        .trim()
        .parse::<i32>()
        .map_err(|_| PortError::Validation(format!("El campo '{campo}' debe ser un número entero")))
}

fn parsear_f64(valor: &str, campo: &str) -> PortResult<f64> {
    valor
        .trim()
        .parse::<f64>()
        .map_err(|_| PortError::Validation(format!("El campo '{campo}' debe ser un número")))
}

//=========================================================================================
// JSON Payloads
//=========================================================================================

/// One medicine in a batch insert.
#[derive(Deserialize)]
pub struct MedicinaInput {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_compra: NaiveDate,
    pub fecha_caducidad: NaiveDate,
    #[serde(default)]
    pub cantidad: i32,
    pub proveedor: Option<String>,
    pub precio: f64,
    #[serde(default)]
    pub precio_por_unidad: f64,
}

/// One entry of a bulk update, addressed by id or by name.
#[derive(Deserialize)]
pub struct BulkMedicinaInput {
    pub id: Option<Uuid>,
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_compra: Option<NaiveDate>,
    pub fecha_caducidad: Option<NaiveDate>,
    pub cantidad: Option<i32>,
    pub proveedor: Option<String>,
    pub precio: Option<f64>,
    pub precio_por_unidad: Option<f64>,
}

//=========================================================================================
// Derivation Helper
//=========================================================================================

/// Re-derives the computed fields of a merged record right before persist.
fn derivar_campos(medicina: &mut Medicina) {
    medicina.precio_por_unidad = derivar_precio_por_unidad(
        medicina.precio,
        medicina.cantidad,
        medicina.precio_por_unidad,
    );
    medicina.estado = derivar_estado(
        medicina.fecha_caducidad,
        medicina.cantidad,
        Utc::now().date_naive(),
    );
}

fn construir_nueva(entrada: MedicinaInput, foto: Option<String>) -> PortResult<NuevaMedicina> {
    let descripcion = entrada
        .descripcion
        .unwrap_or_else(|| "Sin descripción".to_string());
    let proveedor = entrada
        .proveedor
        .unwrap_or_else(|| "Desconocido".to_string());

    validate::validar_medicina(
        &entrada.nombre,
        &descripcion,
        &proveedor,
        entrada.cantidad,
        entrada.precio,
        entrada.fecha_compra,
        entrada.fecha_caducidad,
    )?;

    let precio_por_unidad = derivar_precio_por_unidad(
        entrada.precio,
        entrada.cantidad,
        entrada.precio_por_unidad,
    );
    let estado = derivar_estado(
        entrada.fecha_caducidad,
        entrada.cantidad,
        Utc::now().date_naive(),
    );

    Ok(NuevaMedicina {
        nombre: entrada.nombre,
        descripcion,
        foto,
        fecha_compra: entrada.fecha_compra,
        fecha_caducidad: entrada.fecha_caducidad,
        cantidad: entrada.cantidad,
        proveedor,
        precio: entrada.precio,
        precio_por_unidad,
        estado,
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/inventario - List all medicines, newest first.
#[utoipa::path(
    get,
    path = "/api/inventario",
    responses(
        (status = 200, description = "List of medicines"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_medicinas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let medicinas = state.inventario.find_all().await?;
    Ok(Json(json!({
        "message": "Lista de medicinas obtenida correctamente",
        "medicinas": medicinas,
    })))
}

/// GET /api/inventario/{id}
pub async fn get_medicina_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let medicina = state.inventario.find_by_id(id).await?;
    Ok(Json(json!({
        "message": "Medicina obtenida correctamente",
        "medicina": medicina,
    })))
}

/// POST /api/inventario - Create one medicine from a multipart form with an
/// optional `foto` image part (jpeg/png/webp, at most 5 MB).
#[utoipa::path(
    post,
    path = "/api/inventario",
    request_body(content_type = "multipart/form-data", description = "Medicine fields plus optional 'foto' image part."),
    responses(
        (status = 201, description = "Medicine created"),
        (status = 400, description = "Missing or malformed field"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_medicina(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let campos = leer_multipart(multipart).await?;
    let textos = &campos.textos;

    let faltan = ["nombre", "fecha_compra", "fecha_caducidad", "precio"]
        .iter()
        .any(|campo| textos.get(*campo).map_or(true, |v| v.trim().is_empty()));
    if faltan {
        return Err(PortError::Validation(CAMPOS_OBLIGATORIOS.to_string()).into());
    }

    let entrada = MedicinaInput {
        nombre: textos["nombre"].clone(),
        descripcion: textos.get("descripcion").cloned(),
        fecha_compra: parsear_fecha(&textos["fecha_compra"], "fecha_compra")?,
        fecha_caducidad: parsear_fecha(&textos["fecha_caducidad"], "fecha_caducidad")?,
        cantidad: match textos.get("cantidad") {
            Some(v) => parsear_i32(v, "cantidad")?,
            None => 0,
        },
        proveedor: textos.get("proveedor").cloned(),
        precio: parsear_f64(&textos["precio"], "precio")?,
        precio_por_unidad: match textos.get("precio_por_unidad") {
            Some(v) => parsear_f64(v, "precio_por_unidad")?,
            None => 0.0,
        },
    };

    // Validation happens inside `construir_nueva` before the photo is
    // stored, so a bad request leaves no orphan file behind.
    let mut nueva = construir_nueva(entrada, None)?;
    if let Some(foto) = &campos.foto {
        nueva.foto = Some(state.fotos.save(&foto.nombre, &foto.datos).await?);
    }

    let medicina = state.inventario.insert(nueva).await?;
    info!(medicina = %medicina.nombre, "Medicina creada");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Medicina creada correctamente", "medicina": medicina })),
    ))
}

/// POST /api/inventario/lote - Batch insert from a JSON array; the batch is
/// transactional, all rows land or none do.
pub async fn create_medicinas_lote(
    State(state): State<Arc<AppState>>,
    Json(entradas): Json<Vec<MedicinaInput>>,
) -> Result<impl IntoResponse, ApiError> {
    if entradas.is_empty() {
        return Err(
            PortError::Validation("Debe enviar un array de medicinas".to_string()).into(),
        );
    }

    let nuevas = entradas
        .into_iter()
        .map(|entrada| construir_nueva(entrada, None))
        .collect::<PortResult<Vec<_>>>()?;

    let medicinas = state.inventario.insert_many(nuevas).await?;
    info!(creadas = medicinas.len(), "Lote de medicinas creado");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} medicinas creadas correctamente", medicinas.len()),
            "medicinas": medicinas,
        })),
    ))
}

/// PUT /api/inventario/{id} - Update one medicine from a multipart form.
/// A new `foto` part replaces (and deletes) the previous photo.
pub async fn update_medicina(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut medicina = state.inventario.find_by_id(id).await?;
    let campos = leer_multipart(multipart).await?;
    let textos = &campos.textos;

    if let Some(v) = textos.get("nombre") {
        medicina.nombre = v.clone();
    }
    if let Some(v) = textos.get("descripcion") {
        medicina.descripcion = v.clone();
    }
    if let Some(v) = textos.get("fecha_compra") {
        medicina.fecha_compra = parsear_fecha(v, "fecha_compra")?;
    }
    if let Some(v) = textos.get("fecha_caducidad") {
        medicina.fecha_caducidad = parsear_fecha(v, "fecha_caducidad")?;
    }
    if let Some(v) = textos.get("cantidad") {
        medicina.cantidad = parsear_i32(v, "cantidad")?;
    }
    if let Some(v) = textos.get("proveedor") {
        medicina.proveedor = v.clone();
    }
    if let Some(v) = textos.get("precio") {
        medicina.precio = parsear_f64(v, "precio")?;
    }
    if let Some(v) = textos.get("precio_por_unidad") {
        medicina.precio_por_unidad = parsear_f64(v, "precio_por_unidad")?;
    }

    validate::validar_medicina(
        &medicina.nombre,
        &medicina.descripcion,
        &medicina.proveedor,
        medicina.cantidad,
        medicina.precio,
        medicina.fecha_compra,
        medicina.fecha_caducidad,
    )?;
    derivar_campos(&mut medicina);

    if let Some(foto) = &campos.foto {
        let nueva_foto = state.fotos.save(&foto.nombre, &foto.datos).await?;
        if let Some(anterior) = medicina.foto.take() {
            state.fotos.delete(&anterior).await?;
        }
        medicina.foto = Some(nueva_foto);
    }

    let medicina = state.inventario.update(&medicina).await?;
    Ok(Json(json!({ "message": "Medicina actualizada correctamente", "medicina": medicina })))
}

/// PUT /api/inventario - Bulk update. Each entry is matched by id, or by
/// name when no id is given; unmatched entries are reported back, not
/// treated as failures.
pub async fn update_many_medicinas(
    State(state): State<Arc<AppState>>,
    Json(entradas): Json<Vec<BulkMedicinaInput>>,
) -> Result<Json<Value>, ApiError> {
    if entradas.is_empty() {
        return Err(PortError::Validation(
            "Debe enviar un array de medicinas para actualizar".to_string(),
        )
        .into());
    }

    let mut actualizadas = 0usize;
    let mut no_encontradas: Vec<String> = Vec::new();

    for entrada in entradas {
        let identificador = entrada
            .nombre
            .clone()
            .or_else(|| entrada.id.map(|id| id.to_string()))
            .unwrap_or_else(|| "(sin identificador)".to_string());

        let buscada = match (entrada.id, entrada.nombre.as_deref()) {
            (Some(id), _) => state.inventario.find_by_id(id).await,
            (None, Some(nombre)) => state.inventario.find_by_nombre(nombre).await,
            (None, None) => {
                no_encontradas.push(identificador);
                continue;
            }
        };

        let mut medicina = match buscada {
            Ok(m) => m,
            Err(PortError::NotFound(_)) => {
                no_encontradas.push(identificador);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(v) = entrada.nombre {
            medicina.nombre = v;
        }
        if let Some(v) = entrada.descripcion {
            medicina.descripcion = v;
        }
        if let Some(v) = entrada.fecha_compra {
            medicina.fecha_compra = v;
        }
        if let Some(v) = entrada.fecha_caducidad {
            medicina.fecha_caducidad = v;
        }
        if let Some(v) = entrada.cantidad {
            medicina.cantidad = v;
        }
        if let Some(v) = entrada.proveedor {
            medicina.proveedor = v;
        }
        if let Some(v) = entrada.precio {
            medicina.precio = v;
        }
        if let Some(v) = entrada.precio_por_unidad {
            medicina.precio_por_unidad = v;
        }

        validate::validar_medicina(
            &medicina.nombre,
            &medicina.descripcion,
            &medicina.proveedor,
            medicina.cantidad,
            medicina.precio,
            medicina.fecha_compra,
            medicina.fecha_caducidad,
        )?;
        derivar_campos(&mut medicina);

        state.inventario.update(&medicina).await?;
        actualizadas += 1;
    }

    Ok(Json(json!({
        "message": format!("{} medicinas actualizadas correctamente", actualizadas),
        "no_encontradas": no_encontradas,
    })))
}

/// DELETE /api/inventario/{id} - Delete a medicine and its photo asset, if
/// it had one.
pub async fn delete_medicina(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let medicina = state.inventario.delete(id).await?;

    if let Some(foto) = &medicina.foto {
        state.fotos.delete(foto).await?;
    }
    info!(medicina = %medicina.nombre, "Medicina eliminada");

    Ok(Json(json!({ "message": "Medicina eliminada correctamente", "medicina": medicina })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::testing;
    use async_trait::async_trait;
    use farmacia_core::domain::Estado;
    use farmacia_core::ports::{FotoStore, InventarioStore};
    use std::sync::Mutex;

    /// Deletes always succeed and hand back a record with the given photo.
    struct InventarioConFoto {
        foto: Option<String>,
    }

    #[async_trait]
    impl InventarioStore for InventarioConFoto {
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

        async fn delete(&self, id: Uuid) -> PortResult<Medicina> {
            Ok(Medicina {
                id,
                nombre: "Amoxicilina".to_string(),
                descripcion: String::new(),
                foto: self.foto.clone(),
                fecha_compra: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                fecha_caducidad: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
                cantidad: 3,
                proveedor: "ACME".to_string(),
                precio: 12.5,
                precio_por_unidad: 12.5,
                estado: Estado::Disponible,
                created_at: Utc::now(),
            })
        }
    }

    /// Records deleted filenames; missing files are fine, like on disk.
    #[derive(Default)]
    struct FotosRegistradas {
        eliminadas: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FotoStore for FotosRegistradas {
        async fn save(&self, _original_name: &str, _data: &[u8]) -> PortResult<String> {
            unimplemented!()
        }

        async fn delete(&self, filename: &str) -> PortResult<()> {
            self.eliminadas.lock().unwrap().push(filename.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn eliminar_una_medicina_borra_su_foto() {
        let fotos = Arc::new(FotosRegistradas::default());
        let mut estado = testing::estado_de_prueba();
        estado.inventario = Arc::new(InventarioConFoto {
            foto: Some("amoxicilina_1a2b3c.png".to_string()),
        });
        estado.fotos = fotos.clone();

        delete_medicina(State(Arc::new(estado)), Path(Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(
            *fotos.eliminadas.lock().unwrap(),
            vec!["amoxicilina_1a2b3c.png".to_string()]
        );
    }

    #[tokio::test]
    async fn eliminar_una_medicina_sin_foto_no_toca_el_almacen() {
        let fotos = Arc::new(FotosRegistradas::default());
        let mut estado = testing::estado_de_prueba();
        estado.inventario = Arc::new(InventarioConFoto { foto: None });
        estado.fotos = fotos.clone();

        delete_medicina(State(Arc::new(estado)), Path(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(fotos.eliminadas.lock().unwrap().is_empty());
    }

    #[test]
    fn parsear_fecha_acepta_fecha_plana_y_rfc3339() {
        let esperada = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(parsear_fecha("2026-03-15", "fecha_compra").unwrap(), esperada);
        assert_eq!(
            parsear_fecha("2026-03-15T10:30:00Z", "fecha_compra").unwrap(),
            esperada
        );
        assert!(parsear_fecha("15/03/2026", "fecha_compra").is_err());
    }

    #[test]
    fn parsear_numeros_rechaza_basura() {
        assert_eq!(parsear_i32(" 7 ", "cantidad").unwrap(), 7);
        assert!(parsear_i32("7.5", "cantidad").is_err());
        assert_eq!(parsear_f64("19.99", "precio").unwrap(), 19.99);
        assert!(parsear_f64("gratis", "precio").is_err());
    }

    #[test]
    fn construir_nueva_deriva_los_campos_calculados() {
        let entrada = MedicinaInput {
            nombre: "Paracetamol".to_string(),
            descripcion: None,
            fecha_compra: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            fecha_caducidad: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            cantidad: 4,
            proveedor: None,
            precio: 100.0,
            precio_por_unidad: 0.0,
        };
        let nueva = construir_nueva(entrada, None).unwrap();

        assert_eq!(nueva.descripcion, "Sin descripción");
        assert_eq!(nueva.proveedor, "Desconocido");
        assert_eq!(nueva.precio_por_unidad, 25.0);
        // Expired long ago regardless of stock.
        assert_eq!(nueva.estado, farmacia_core::domain::Estado::Caducado);
    }
}
