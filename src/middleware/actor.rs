//! Middleware de identidad del actor
//!
//! Lee la cabecera opcional `x-actor-id` e inyecta un `Actor` en las
//! extensions de la request. Los handlers lo pasan explícitamente a los
//! controladores para rellenar `created_by`/`updated_by`.

use axum::{extract::Request, http::HeaderName, middleware::Next, response::Response};
use uuid::Uuid;

use crate::utils::errors::{bad_request_error, AppError};

pub const ACTOR_HEADER: HeaderName = HeaderName::from_static("x-actor-id");

/// Usuario que ejecuta la operación (`None` si la cabecera no viene)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor(pub Option<Uuid>);

impl Actor {
    /// Parsea el valor de la cabecera; vacía equivale a ausente
    pub fn from_header(value: Option<&[u8]>) -> Result<Self, AppError> {
        let raw = match value {
            Some(bytes) => std::str::from_utf8(bytes)
                .map_err(|_| bad_request_error("Invalid x-actor-id header"))?
                .trim(),
            None => return Ok(Actor(None)),
        };
        if raw.is_empty() {
            return Ok(Actor(None));
        }
        Uuid::parse_str(raw)
            .map(|id| Actor(Some(id)))
            .map_err(|_| bad_request_error("Invalid x-actor-id header"))
    }
}

pub async fn actor_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let actor = Actor::from_header(request.headers().get(&ACTOR_HEADER).map(|v| v.as_bytes()))?;
    if let Some(id) = actor.0 {
        tracing::debug!("👤 Actor {}", id);
    }
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_header_is_anonymous() {
        assert_eq!(Actor::from_header(None).unwrap(), Actor(None));
        assert_eq!(Actor::from_header(Some(b"  ")).unwrap(), Actor(None));
    }

    #[test]
    fn test_valid_and_malformed_header() {
        let id = Uuid::new_v4();
        let actor = Actor::from_header(Some(id.to_string().as_bytes())).unwrap();
        assert_eq!(actor, Actor(Some(id)));
        assert!(matches!(
            Actor::from_header(Some(b"not-a-uuid")),
            Err(AppError::BadRequest(_))
        ));
    }
}
