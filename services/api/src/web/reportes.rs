//! services/api/src/web/reportes.rs
//!
//! Report generation endpoint. The aggregation itself lives in
//! `farmacia_core::report`; this module loads the inventory, runs it, and
//! persists the snapshot. An empty inventory short-circuits with an
//! all-zero body and writes nothing.

use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use farmacia_core::domain::{DetalleReporte, Medicina, ReporteInventario, TIPO_INVENTARIO};
use farmacia_core::ports::{InventarioStore, PortResult, ReporteStore};
use farmacia_core::report::resumir_inventario;

/// Report figures as the endpoint returns them. `id` is absent on the
/// empty-inventory response, which is never persisted.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReporteBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub tipo: String,
    pub total_medicinas: i64,
    pub disponibles: i64,
    pub agotadas: i64,
    pub caducadas: i64,
    pub valor_total_inventario: f64,
    #[schema(value_type = Object)]
    pub detalle: DetalleReporte,
    pub fecha_generado: DateTime<Utc>,
}

impl ReporteBody {
    fn vacio(fecha_generado: DateTime<Utc>) -> Self {
        Self {
            id: None,
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
            fecha_generado,
        }
    }
}

impl From<ReporteInventario> for ReporteBody {
    fn from(r: ReporteInventario) -> Self {
        Self {
            id: Some(r.id),
            tipo: r.tipo,
            total_medicinas: r.total_medicinas,
            disponibles: r.disponibles,
            agotadas: r.agotadas,
            caducadas: r.caducadas,
            valor_total_inventario: r.valor_total_inventario,
            detalle: r.detalle,
            fecha_generado: r.fecha_generado,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RespuestaReporte {
    pub message: String,
    pub reporte: ReporteBody,
    #[schema(value_type = Vec<Object>)]
    pub medicinas: Vec<Medicina>,
}

/// Runs the aggregation against the whole inventory. Kept separate from the
/// axum layer so the write-skipping rule is testable with stub stores.
pub async fn generar_reporte_inventario(
    inventario: &dyn InventarioStore,
    reportes: &dyn ReporteStore,
) -> PortResult<RespuestaReporte> {
    let mut medicinas = inventario.find_all().await?;

    if medicinas.is_empty() {
        return Ok(RespuestaReporte {
            message: "No hay medicinas registradas en el sistema.".to_string(),
            reporte: ReporteBody::vacio(Utc::now()),
            medicinas,
        });
    }

    let resumen = resumir_inventario(&mut medicinas, Utc::now().date_naive());
    let reporte = reportes.insert(resumen).await?;
    info!(total = reporte.total_medicinas, "Reporte de inventario generado");

    Ok(RespuestaReporte {
        message: "Reporte generado correctamente.".to_string(),
        reporte: reporte.into(),
        medicinas,
    })
}

/// GET /api/reportes/inventario - Aggregate the inventory and persist one
/// report snapshot.
#[utoipa::path(
    get,
    path = "/api/reportes/inventario",
    responses(
        (status = 200, description = "Report generated", body = RespuestaReporte),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_reporte_inventario(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RespuestaReporte>, ApiError> {
    let respuesta =
        generar_reporte_inventario(state.inventario.as_ref(), state.reportes.as_ref()).await?;
    Ok(Json(respuesta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use farmacia_core::domain::{Estado, NuevaMedicina, ResumenInventario};
    use farmacia_core::ports::PortError;
    use std::sync::Mutex;

    struct StubInventario(Vec<Medicina>);

    #[async_trait]
    impl InventarioStore for StubInventario {
        async fn find_all(&self) -> PortResult<Vec<Medicina>> {
            Ok(self.0.clone())
        }

        async fn find_by_id(&self, id: Uuid) -> PortResult<Medicina> {
            Err(PortError::NotFound(id.to_string()))
        }

        async fn find_by_nombre(&self, nombre: &str) -> PortResult<Medicina> {
            Err(PortError::NotFound(nombre.to_string()))
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

    #[derive(Default)]
    struct StubReportes {
        insertado: Mutex<Option<ResumenInventario>>,
    }

    #[async_trait]
    impl ReporteStore for StubReportes {
        async fn insert(&self, resumen: ResumenInventario) -> PortResult<ReporteInventario> {
            let reporte = ReporteInventario {
                id: Uuid::new_v4(),
                tipo: resumen.tipo.clone(),
                total_medicinas: resumen.total_medicinas,
                disponibles: resumen.disponibles,
                agotadas: resumen.agotadas,
                caducadas: resumen.caducadas,
                valor_total_inventario: resumen.valor_total_inventario,
                detalle: resumen.detalle.clone(),
                fecha_generado: Utc::now(),
            };
            *self.insertado.lock().unwrap() = Some(resumen);
            Ok(reporte)
        }
    }

    fn medicina(nombre: &str, cantidad: i32, precio: f64, caduca: NaiveDate) -> Medicina {
        Medicina {
            id: Uuid::new_v4(),
            nombre: nombre.to_string(),
            descripcion: String::new(),
            foto: None,
            fecha_compra: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            fecha_caducidad: caduca,
            cantidad,
            proveedor: "Desconocido".to_string(),
            precio,
            precio_por_unidad: 0.0,
            estado: Estado::Disponible,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn inventario_vacio_no_escribe_snapshot() {
        let inventario = StubInventario(Vec::new());
        let reportes = StubReportes::default();

        let respuesta = generar_reporte_inventario(&inventario, &reportes)
            .await
            .unwrap();

        assert_eq!(respuesta.message, "No hay medicinas registradas en el sistema.");
        assert_eq!(respuesta.reporte.total_medicinas, 0);
        assert!(respuesta.reporte.id.is_none());
        assert!(respuesta.medicinas.is_empty());
        assert!(reportes.insertado.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn inventario_con_stock_persiste_las_cifras() {
        let manana = Utc::now().date_naive() + chrono::Days::new(1);
        let ayer = Utc::now().date_naive() - chrono::Days::new(1);
        let inventario = StubInventario(vec![
            medicina("Ibuprofeno", 10, 50.0, manana),
            medicina("Amoxicilina", 0, 80.0, manana),
            medicina("Loratadina", 5, 30.0, ayer),
        ]);
        let reportes = StubReportes::default();

        let respuesta = generar_reporte_inventario(&inventario, &reportes)
            .await
            .unwrap();

        assert_eq!(respuesta.message, "Reporte generado correctamente.");
        assert!(respuesta.reporte.id.is_some());
        assert_eq!(respuesta.reporte.total_medicinas, 3);
        assert_eq!(respuesta.reporte.disponibles, 1);
        assert_eq!(respuesta.reporte.agotadas, 1);
        assert_eq!(respuesta.reporte.caducadas, 1);
        assert_eq!(respuesta.reporte.valor_total_inventario, 160.0);
        assert_eq!(respuesta.reporte.detalle.total_con_cantidad, 15);
        assert_eq!(respuesta.medicinas.len(), 3);

        let guardado = reportes.insertado.lock().unwrap().take().unwrap();
        assert_eq!(guardado.total_medicinas, 3);
        assert_eq!(guardado.detalle.top_costosas[0].nombre, "Amoxicilina");
    }
}
