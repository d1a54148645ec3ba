//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use validator::ValidationError;

use crate::utils::errors::{bad_request_error, AppResult};

lazy_static! {
    /// Matrícula normalizada: mayúsculas, dígitos y guiones, 6 a 10 caracteres
    static ref LICENSE_PLATE_RE: Regex = Regex::new(r"^[A-Z0-9-]{6,10}$").unwrap();
}

/// Normaliza identificadores de negocio (matrículas, códigos, números de licencia)
pub fn normalize_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Validar formato de matrícula de vehículo (se evalúa ya normalizada)
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE_RE.is_match(&normalize_code(value)) {
        let mut error = ValidationError::new("license_plate");
        error.message = Some(
            "License plate must be 6-10 characters (letters, digits, hyphens)".into(),
        );
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

// Variantes por referencia para `#[validate(custom = "...")]`

pub fn positive_f64(value: f64) -> Result<(), ValidationError> {
    validate_positive(value)
}

pub fn non_negative_f64(value: f64) -> Result<(), ValidationError> {
    validate_non_negative(value)
}

pub fn positive_amount(value: &rust_decimal::Decimal) -> Result<(), ValidationError> {
    validate_positive(*value)
}

pub fn non_negative_amount(value: &rust_decimal::Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value)
}

/// Parsea un UUID recibido como texto en query strings
pub fn parse_uuid(value: &str, field: &str) -> AppResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value.trim())
        .map_err(|_| bad_request_error(format!("Invalid {}", field)))
}

/// Lista separada por comas de valores de un enum (`status=a,b`)
pub fn parse_csv<T>(value: &str) -> Result<Vec<T>, Vec<String>>
where
    T: std::str::FromStr,
{
    let mut parsed = Vec::new();
    let mut invalid = Vec::new();
    for raw in value.split(',').map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        match raw.parse::<T>() {
            Ok(v) => parsed.push(v),
            Err(_) => invalid.push(raw),
        }
    }
    if invalid.is_empty() {
        Ok(parsed)
    } else {
        Err(invalid)
    }
}

/// Texto obligatorio: devuelve el valor recortado o un 400 con el mensaje dado
pub fn require_text(value: Option<&str>, message: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(bad_request_error(message)),
    }
}

/// Parsea una fecha `YYYY-MM-DD` o un datetime RFC 3339 y devuelve la fecha
pub fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| bad_request_error(format!("Invalid {}. Use ISO 8601 format (e.g. 2026-01-15)", field)))
}

/// Parsea un datetime RFC 3339; una fecha sola se interpreta como medianoche local
pub fn parse_datetime(value: &str, field: &str) -> AppResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| bad_request_error(format!("Invalid {}. Use ISO 8601 format (e.g. 2026-01-15)", field)))?;
    Ok(start_of_local_day(date))
}

/// Medianoche local de la fecha dada, en UTC
pub fn start_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN)
}

/// Fecha local de hoy
pub fn local_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// Fin del día local (23:59:59.999) para la fecha del instante dado
pub fn end_of_local_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    let date = instant.with_timezone(&Local).date_naive();
    let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    local_instant(date, time)
}

fn local_instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Redondeo a un decimal (tasas porcentuales)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Redondeo a dos decimales (importes y ratios)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rust_decimal::Decimal;

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("AB-123-CD").is_ok());
        assert!(validate_license_plate("gj01ab1234").is_ok());
        assert!(validate_license_plate("AB12").is_err());
        assert!(validate_license_plate("ABCDEFGHIJK").is_err());
        assert!(validate_license_plate("AB 1234").is_err());
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  emp-001 "), "EMP-001");
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(5).is_ok());
        assert!(validate_positive(0).is_err());
        assert!(validate_positive(Decimal::new(-5, 1)).is_err());
        assert!(validate_non_negative(0.0).is_ok());
        assert!(validate_non_negative(-0.5).is_err());
    }

    #[test]
    fn test_parse_csv_reports_invalid_values() {
        use crate::models::vehicle::VehicleStatus;
        let ok: Vec<VehicleStatus> = parse_csv("available, ON_TRIP").unwrap();
        assert_eq!(ok, vec![VehicleStatus::Available, VehicleStatus::OnTrip]);
        let err = parse_csv::<VehicleStatus>("available,parked").unwrap_err();
        assert_eq!(err, vec!["parked".to_string()]);
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text(Some("  Depot A "), "Origin is required").unwrap(), "Depot A");
        assert!(require_text(Some("   "), "Origin is required").is_err());
        assert!(require_text(None, "Origin is required").is_err());
    }

    #[test]
    fn test_parse_date_accepts_date_and_datetime() {
        let d = parse_date("2026-01-15", "date").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2026, 1, 15));
        let d = parse_date("2026-01-15T10:00:00Z", "date").unwrap();
        assert_eq!(d.day(), 15);
        assert!(parse_date("15/01/2026", "date").is_err());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("2026-01-15T08:30:00Z", "startDate").is_ok());
        assert!(parse_datetime("2026-01-15", "startDate").is_ok());
        assert!(parse_datetime("not-a-date", "startDate").is_err());
    }

    #[test]
    fn test_end_of_local_day_is_after_start() {
        let start = parse_datetime("2026-01-15", "startDate").unwrap();
        let end = end_of_local_day(start);
        assert!(end > start);
        assert!(end - start < chrono::Duration::days(1));
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round2(3.14159), 3.14);
    }
}
