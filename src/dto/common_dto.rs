use serde::Serialize;

use crate::utils::errors::{bad_request_error, AppResult};

pub const DEFAULT_PAGE_LIMIT: usize = 20;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Respuesta sin datos (borrados)
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// `page`/`limit` de la query; por defecto página 1 de 20
pub fn parse_pagination(page: Option<&str>, limit: Option<&str>) -> AppResult<(usize, usize)> {
    let parse = |raw: Option<&str>, default: usize| -> AppResult<usize> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(default),
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| bad_request_error("page and limit must be positive integers")),
        }
    };
    Ok((parse(page, 1)?, parse(limit, DEFAULT_PAGE_LIMIT)?))
}

/// Flags booleanos de query (`?upcoming=true`)
pub fn query_flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_errors() {
        assert_eq!(parse_pagination(None, None).unwrap(), (1, 20));
        assert_eq!(parse_pagination(Some("3"), Some("5")).unwrap(), (3, 5));
        assert!(parse_pagination(Some("0"), None).is_err());
        assert!(parse_pagination(None, Some("ten")).is_err());
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success_with_message(1, "Vehicle created successfully")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 1);
        assert_eq!(json["message"], "Vehicle created successfully");
    }
}
