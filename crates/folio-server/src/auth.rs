// Capability token enforcement (HMAC signed JSON claims)

use crate::config::CapKeys;
use crate::error::ApiError;
use axum::http::HeaderMap;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as b64, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub const SUPERADMIN: &str = "superadmin";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing)]
    pub kid: Option<String>,
}

/// Token format: `kid.payload.sig`, payload and sig base64url without padding,
/// sig = HMAC-SHA256(secret, payload).
pub fn sign_token(kid: &str, secret: &str, claims: &Claims) -> String {
    let payload = serde_json::to_vec(claims).unwrap_or_default();
    let mut mac = <Hmac<Sha256>>::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(&payload);
    let sig = mac.finalize().into_bytes();
    format!("{}.{}.{}", kid, b64.encode(&payload), b64.encode(sig))
}

/// Verifies the bearer token and that it carries `role`. With no keys
/// configured every request passes with empty claims.
pub fn enforce_caps(headers: &HeaderMap, keys: &CapKeys, role: &str) -> Result<Claims, ApiError> {
    if keys.is_open() {
        return Ok(Claims::default());
    }
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("missing token"))?;
    let mut parts = token.split('.');
    let (Some(kid), Some(payload), Some(sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiError::Unauthorized("bad token"));
    };
    let payload = b64
        .decode(payload)
        .map_err(|_| ApiError::Unauthorized("bad token"))?;
    let sig = b64
        .decode(sig)
        .map_err(|_| ApiError::Unauthorized("bad token"))?;
    let secret = keys
        .secret_for(kid)
        .ok_or(ApiError::Unauthorized("unknown kid"))?;
    let mut mac = <Hmac<Sha256>>::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::Unauthorized("bad key"))?;
    mac.update(&payload);
    mac.verify_slice(&sig)
        .map_err(|_| ApiError::Unauthorized("bad sig"))?;
    let mut claims: Claims =
        serde_json::from_slice(&payload).map_err(|_| ApiError::Unauthorized("bad claims"))?;
    claims.kid = Some(kid.to_string());
    if let Some(exp) = claims.exp {
        if exp < chrono::Utc::now().timestamp() {
            return Err(ApiError::Unauthorized("expired"));
        }
    }
    if claims.role.as_deref() != Some(role) {
        return Err(ApiError::Forbidden("role denied"));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapKey;
    use axum::http::HeaderValue;

    fn keys() -> CapKeys {
        CapKeys {
            active: Some(CapKey {
                id: "active".into(),
                secret: "s3cret".into(),
            }),
            next: None,
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        h
    }

    fn admin() -> Claims {
        Claims {
            sub: Some("ops".into()),
            role: Some(SUPERADMIN.into()),
            ..Default::default()
        }
    }

    #[test]
    fn open_mode_allows_everything() {
        assert!(enforce_caps(&HeaderMap::new(), &CapKeys::default(), SUPERADMIN).is_ok());
    }

    #[test]
    fn valid_superadmin_token_passes() {
        let token = sign_token("active", "s3cret", &admin());
        let claims = enforce_caps(&bearer(&token), &keys(), SUPERADMIN).unwrap();
        assert_eq!(claims.kid.as_deref(), Some("active"));
        assert_eq!(claims.sub.as_deref(), Some("ops"));
    }

    #[test]
    fn rejects_missing_forged_expired_and_wrong_role() {
        assert!(matches!(
            enforce_caps(&HeaderMap::new(), &keys(), SUPERADMIN),
            Err(ApiError::Unauthorized("missing token"))
        ));
        let forged = sign_token("active", "other", &admin());
        assert!(matches!(
            enforce_caps(&bearer(&forged), &keys(), SUPERADMIN),
            Err(ApiError::Unauthorized("bad sig"))
        ));
        let expired = sign_token(
            "active",
            "s3cret",
            &Claims {
                exp: Some(1),
                ..admin()
            },
        );
        assert!(matches!(
            enforce_caps(&bearer(&expired), &keys(), SUPERADMIN),
            Err(ApiError::Unauthorized("expired"))
        ));
        let editor = sign_token(
            "active",
            "s3cret",
            &Claims {
                role: Some("editor".into()),
                ..Default::default()
            },
        );
        assert!(matches!(
            enforce_caps(&bearer(&editor), &keys(), SUPERADMIN),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            enforce_caps(&bearer("a.b"), &keys(), SUPERADMIN),
            Err(ApiError::Unauthorized("bad token"))
        ));
    }
}
