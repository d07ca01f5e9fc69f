//! services/api/src/web/validate.rs
//!
//! Field-level validation shared by the CRUD handlers. Every check runs
//! before any mutation; messages are the ones the frontend displays.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use farmacia_core::ports::{PortError, PortResult};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,4}$").expect("email regex is valid")
    })
}

fn route_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/[a-zA-Z0-9/_-]*$").expect("route regex is valid"))
}

fn invalido(mensaje: &str) -> PortError {
    PortError::Validation(mensaje.to_string())
}

pub fn validar_nombre_rol(name: &str) -> PortResult<()> {
    let largo = name.chars().count();
    if largo < 3 {
        return Err(invalido("El nombre del rol debe tener al menos 3 caracteres"));
    }
    if largo > 50 {
        return Err(invalido("El nombre del rol no puede exceder los 50 caracteres"));
    }
    Ok(())
}

pub fn validar_descripcion_rol(description: &str) -> PortResult<()> {
    if description.chars().count() > 200 {
        return Err(invalido("La descripción no puede exceder los 200 caracteres"));
    }
    Ok(())
}

pub fn validar_default_route(route: &str) -> PortResult<()> {
    if route.chars().count() > 100 {
        return Err(invalido("La ruta por defecto no puede exceder los 100 caracteres"));
    }
    if !route_regex().is_match(route) {
        return Err(invalido(
            "La ruta por defecto debe comenzar con '/' y solo puede contener letras, números, guiones o guiones bajos",
        ));
    }
    Ok(())
}

pub fn validar_nombre_usuario(name: &str) -> PortResult<()> {
    let largo = name.chars().count();
    if largo < 2 {
        return Err(invalido("El nombre debe tener al menos 2 caracteres"));
    }
    if largo > 100 {
        return Err(invalido("El nombre no puede exceder los 100 caracteres"));
    }
    Ok(())
}

pub fn validar_email(email: &str) -> PortResult<()> {
    if !email_regex().is_match(email) {
        return Err(invalido("El formato del email no es válido"));
    }
    Ok(())
}

pub fn validar_password(password: &str) -> PortResult<()> {
    if password.chars().count() < 6 {
        return Err(invalido("La contraseña debe tener al menos 6 caracteres"));
    }
    Ok(())
}

/// Validates the merged field set of a medicine before it is persisted.
pub fn validar_medicina(
    nombre: &str,
    descripcion: &str,
    proveedor: &str,
    cantidad: i32,
    precio: f64,
    fecha_compra: NaiveDate,
    fecha_caducidad: NaiveDate,
) -> PortResult<()> {
    let largo = nombre.chars().count();
    if largo < 2 {
        return Err(invalido("El nombre debe tener al menos 2 caracteres"));
    }
    if largo > 150 {
        return Err(invalido("El nombre no puede exceder los 150 caracteres"));
    }
    if descripcion.chars().count() > 500 {
        return Err(invalido("La descripción no puede exceder los 500 caracteres"));
    }
    if proveedor.chars().count() > 150 {
        return Err(invalido(
            "El nombre del proveedor no puede exceder los 150 caracteres",
        ));
    }
    if cantidad < 0 {
        return Err(invalido("La cantidad no puede ser negativa"));
    }
    if precio < 0.0 {
        return Err(invalido("El precio no puede ser negativo"));
    }
    if fecha_caducidad <= fecha_compra {
        return Err(invalido(
            "La fecha de caducidad debe ser posterior a la fecha de compra",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fecha(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn nombre_de_rol_respeta_los_limites() {
        assert!(validar_nombre_rol("ab").is_err());
        assert!(validar_nombre_rol("abc").is_ok());
        assert!(validar_nombre_rol(&"x".repeat(50)).is_ok());
        assert!(validar_nombre_rol(&"x".repeat(51)).is_err());
    }

    #[test]
    fn ruta_por_defecto_exige_el_patron() {
        assert!(validar_default_route("/dashboard").is_ok());
        assert!(validar_default_route("/inventario/medicinas_2").is_ok());
        assert!(validar_default_route("dashboard").is_err());
        assert!(validar_default_route("/con espacios").is_err());
        assert!(validar_default_route(&format!("/{}", "a".repeat(100))).is_err());
    }

    #[test]
    fn emails_malformados_se_rechazan() {
        assert!(validar_email("ana@farmacia.com").is_ok());
        assert!(validar_email("ana.perez@farmacia.com.mx").is_ok());
        assert!(validar_email("sin-arroba").is_err());
        assert!(validar_email("dos@@farmacia.com").is_err());
        assert!(validar_email("ana@").is_err());
    }

    #[test]
    fn medicina_exige_caducidad_posterior_a_compra() {
        let compra = fecha("2026-01-10");
        assert!(validar_medicina("Ibuprofeno", "", "ACME", 5, 10.0, compra, fecha("2026-06-01")).is_ok());
        // Same day counts as not-after.
        assert!(validar_medicina("Ibuprofeno", "", "ACME", 5, 10.0, compra, compra).is_err());
        assert!(validar_medicina("Ibuprofeno", "", "ACME", 5, 10.0, compra, fecha("2025-12-31")).is_err());
    }

    #[test]
    fn medicina_rechaza_negativos_y_nombres_cortos() {
        let compra = fecha("2026-01-10");
        let caduca = fecha("2026-06-01");
        assert!(validar_medicina("I", "", "ACME", 5, 10.0, compra, caduca).is_err());
        assert!(validar_medicina("Ibuprofeno", "", "ACME", -1, 10.0, compra, caduca).is_err());
        assert!(validar_medicina("Ibuprofeno", "", "ACME", 5, -0.5, compra, caduca).is_err());
        assert!(validar_medicina("Ibuprofeno", "", "ACME", 0, 0.0, compra, caduca).is_ok());
    }
}
