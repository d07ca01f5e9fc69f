//! crates/farmacia_core/src/report.rs
//!
//! Status derivation and inventory report aggregation. This is the only
//! business logic in the system with interacting rules, so it lives here
//! in the pure core where it can be tested without any I/O.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::domain::{
    DetalleReporte, Estado, Medicina, MedicinaCostosa, ResumenInventario, TIPO_INVENTARIO,
};

/// How many entries the most-expensive ranking keeps.
const TOP_COSTOSAS: usize = 5;

/// Derives the lifecycle state of an item from its expiry date and stock.
///
/// Expiry wins over depletion: an expired item is `Caducado` no matter how
/// many units remain. The same rule runs before every persist and, in
/// memory only, before every report aggregation.
pub fn derivar_estado(fecha_caducidad: NaiveDate, cantidad: i32, hoy: NaiveDate) -> Estado {
    if fecha_caducidad < hoy {
        Estado::Caducado
    } else if cantidad <= 0 {
        Estado::Agotado
    } else {
        Estado::Disponible
    }
}

/// Derives the unit price of an item.
///
/// A positive declared value is kept as provided; otherwise the unit price
/// is `precio / cantidad` when there is stock, and 0 when there is none.
/// Prices are plain `f64`, no rounding is applied.
pub fn derivar_precio_por_unidad(precio: f64, cantidad: i32, declarado: f64) -> f64 {
    if declarado > 0.0 {
        declarado
    } else if cantidad > 0 {
        precio / f64::from(cantidad)
    } else {
        0.0
    }
}

/// Aggregates the full inventory into one report snapshot.
///
/// Every item's `estado` is recomputed in place first, so the caller gets
/// back a status-corrected list alongside the figures. The total inventory
/// value sums `precio` over ALL items: expired and depleted stock still
/// counts (a documented quirk of the report, not an oversight). The top-5
/// ranking keeps only items with a positive price, ordered by price
/// descending; ties keep their retrieval order (stable sort).
pub fn resumir_inventario(medicinas: &mut [Medicina], hoy: NaiveDate) -> ResumenInventario {
    for m in medicinas.iter_mut() {
        m.estado = derivar_estado(m.fecha_caducidad, m.cantidad, hoy);
    }

    let total_medicinas = medicinas.len() as i64;
    let disponibles = medicinas
        .iter()
        .filter(|m| m.estado == Estado::Disponible)
        .count() as i64;
    let agotadas = medicinas
        .iter()
        .filter(|m| m.estado == Estado::Agotado)
        .count() as i64;
    let caducadas = medicinas
        .iter()
        .filter(|m| m.estado == Estado::Caducado)
        .count() as i64;

    let valor_total_inventario: f64 = medicinas.iter().map(|m| m.precio).sum();

    let mut costosas: Vec<&Medicina> = medicinas.iter().filter(|m| m.precio > 0.0).collect();
    costosas.sort_by(|a, b| b.precio.partial_cmp(&a.precio).unwrap_or(Ordering::Equal));
    let top_costosas = costosas
        .into_iter()
        .take(TOP_COSTOSAS)
        .map(|m| MedicinaCostosa {
            nombre: m.nombre.clone(),
            precio: m.precio,
        })
        .collect();

    let total_con_cantidad = medicinas.iter().map(|m| i64::from(m.cantidad)).sum();

    ResumenInventario {
        tipo: TIPO_INVENTARIO.to_string(),
        total_medicinas,
        disponibles,
        agotadas,
        caducadas,
        valor_total_inventario,
        detalle: DetalleReporte {
            top_costosas,
            total_con_cantidad,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn hoy() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn medicina(nombre: &str, precio: f64, cantidad: i32, fecha_caducidad: NaiveDate) -> Medicina {
        Medicina {
            id: Uuid::new_v4(),
            nombre: nombre.to_string(),
            descripcion: "Sin descripción".to_string(),
            foto: None,
            fecha_compra: fecha_caducidad - Duration::days(365),
            fecha_caducidad,
            cantidad,
            proveedor: "Desconocido".to_string(),
            precio,
            precio_por_unidad: 0.0,
            estado: Estado::Disponible,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn caducidad_pasada_siempre_es_caducado() {
        let ayer = hoy() - Duration::days(1);
        // Expiry wins even with stock on hand.
        assert_eq!(derivar_estado(ayer, 100, hoy()), Estado::Caducado);
        assert_eq!(derivar_estado(ayer, 0, hoy()), Estado::Caducado);
        assert_eq!(derivar_estado(ayer, -3, hoy()), Estado::Caducado);
    }

    #[test]
    fn sin_stock_vigente_es_agotado() {
        let manana = hoy() + Duration::days(1);
        assert_eq!(derivar_estado(manana, 0, hoy()), Estado::Agotado);
        assert_eq!(derivar_estado(manana, -1, hoy()), Estado::Agotado);
        // Expiring today is not expired yet.
        assert_eq!(derivar_estado(hoy(), 0, hoy()), Estado::Agotado);
    }

    #[test]
    fn con_stock_vigente_es_disponible() {
        let manana = hoy() + Duration::days(1);
        assert_eq!(derivar_estado(manana, 1, hoy()), Estado::Disponible);
        assert_eq!(derivar_estado(hoy(), 5, hoy()), Estado::Disponible);
    }

    #[test]
    fn precio_por_unidad_se_deriva_del_total() {
        assert_eq!(derivar_precio_por_unidad(100.0, 4, 0.0), 25.0);
        // A declared positive value is kept untouched.
        assert_eq!(derivar_precio_por_unidad(100.0, 4, 30.0), 30.0);
        // No stock means no meaningful unit price.
        assert_eq!(derivar_precio_por_unidad(100.0, 0, 0.0), 0.0);
    }

    #[test]
    fn resumen_de_inventario_vacio_es_cero() {
        let mut medicinas: Vec<Medicina> = Vec::new();
        let resumen = resumir_inventario(&mut medicinas, hoy());
        assert_eq!(resumen, ResumenInventario::vacio());
    }

    #[test]
    fn los_contadores_particionan_el_total() {
        let ayer = hoy() - Duration::days(1);
        let manana = hoy() + Duration::days(1);
        let mut medicinas = vec![
            medicina("a", 10.0, 3, manana),
            medicina("b", 20.0, 0, manana),
            medicina("c", 30.0, 5, ayer),
            medicina("d", 40.0, 1, manana),
        ];
        let resumen = resumir_inventario(&mut medicinas, hoy());

        assert_eq!(resumen.total_medicinas, 4);
        assert_eq!(
            resumen.disponibles + resumen.agotadas + resumen.caducadas,
            resumen.total_medicinas
        );
        assert_eq!(resumen.disponibles, 2);
        assert_eq!(resumen.agotadas, 1);
        assert_eq!(resumen.caducadas, 1);
    }

    #[test]
    fn el_valor_total_incluye_caducadas_y_agotadas() {
        let ayer = hoy() - Duration::days(1);
        let manana = hoy() + Duration::days(1);
        let mut medicinas = vec![
            medicina("caducada", 100.0, 2, ayer),
            medicina("agotada", 50.0, 0, manana),
            medicina("disponible", 25.0, 1, manana),
        ];
        let resumen = resumir_inventario(&mut medicinas, hoy());
        assert_eq!(resumen.valor_total_inventario, 175.0);
    }

    #[test]
    fn top_costosas_ordena_filtra_y_limita() {
        let manana = hoy() + Duration::days(1);
        let mut medicinas = vec![
            medicina("gratis", 0.0, 1, manana),
            medicina("f", 10.0, 1, manana),
            medicina("e", 20.0, 1, manana),
            medicina("d", 30.0, 1, manana),
            medicina("c", 40.0, 1, manana),
            medicina("b", 50.0, 1, manana),
            medicina("a", 60.0, 1, manana),
        ];
        let resumen = resumir_inventario(&mut medicinas, hoy());

        let top = &resumen.detalle.top_costosas;
        assert_eq!(top.len(), 5);
        let nombres: Vec<&str> = top.iter().map(|t| t.nombre.as_str()).collect();
        assert_eq!(nombres, vec!["a", "b", "c", "d", "e"]);
        assert!(top.iter().all(|t| t.precio > 0.0));
    }

    #[test]
    fn top_costosas_empata_en_orden_de_llegada() {
        let manana = hoy() + Duration::days(1);
        let mut medicinas = vec![
            medicina("primera", 10.0, 1, manana),
            medicina("segunda", 10.0, 1, manana),
            medicina("cara", 99.0, 1, manana),
        ];
        let resumen = resumir_inventario(&mut medicinas, hoy());
        let nombres: Vec<&str> = resumen
            .detalle
            .top_costosas
            .iter()
            .map(|t| t.nombre.as_str())
            .collect();
        assert_eq!(nombres, vec!["cara", "primera", "segunda"]);
    }

    #[test]
    fn escenario_de_dos_medicinas() {
        let ayer = hoy() - Duration::days(1);
        let manana = hoy() + Duration::days(1);
        let mut medicinas = vec![
            medicina("A", 100.0, 0, ayer),
            medicina("B", 50.0, 5, manana),
        ];
        let resumen = resumir_inventario(&mut medicinas, hoy());

        assert_eq!(medicinas[0].estado, Estado::Caducado);
        assert_eq!(medicinas[1].estado, Estado::Disponible);
        assert_eq!(resumen.disponibles, 1);
        assert_eq!(resumen.caducadas, 1);
        assert_eq!(resumen.agotadas, 0);
        assert_eq!(resumen.valor_total_inventario, 150.0);
        assert_eq!(
            resumen.detalle.top_costosas,
            vec![
                MedicinaCostosa { nombre: "A".to_string(), precio: 100.0 },
                MedicinaCostosa { nombre: "B".to_string(), precio: 50.0 },
            ]
        );
        assert_eq!(resumen.detalle.total_con_cantidad, 5);
    }
}
