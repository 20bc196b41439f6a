use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

const BEARER_PREFIX: &str = "bearer ";

/// Raw token captured from the `Authorization` header, not yet verified.
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

/// Pull the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively. Other schemes and an empty token yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let prefix = value.get(..BEARER_PREFIX.len())?;

    if prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        Some(&value[BEARER_PREFIX.len()..])
            .filter(|token| !token.is_empty())
            .map(|token| BearerToken(token.to_string()))
    } else {
        None
    }
}

/// Stage 1: attach a `BearerToken` when the request carries one.
pub async fn mw_extract_token(mut req: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        debug!("MIDDLEWARE: bearer token attached");
        req.extensions_mut().insert(token);
    }

    next.run(req).await
}

/// Stage 2: verify an attached token and attach the resolved `Ctx`.
///
/// Requests without a token pass through untouched. A token that fails
/// verification rejects the request as `invalid token` or `token expired`.
pub async fn mw_resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    if let Some(BearerToken(token)) = req.extensions().get::<BearerToken>().cloned() {
        let claims = state.tokens.verify(&token)?;
        debug!("MIDDLEWARE: identity resolved for {}", claims.username);
        req.extensions_mut()
            .insert(Ctx::new(claims.id, claims.username));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_prefix() {
        let token = bearer_token(&headers("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token.0, "abc.def.ghi");
    }

    #[test]
    fn test_bearer_prefix_case_insensitive() {
        let token = bearer_token(&headers("bEaReR xyz")).unwrap();
        assert_eq!(token.0, "xyz");
    }

    #[test]
    fn test_other_schemes_ignored() {
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_none());
        assert!(bearer_token(&headers("Bearer")).is_none());
        assert!(bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_empty_bearer_token_ignored() {
        assert!(bearer_token(&headers("Bearer ")).is_none());
    }
}
