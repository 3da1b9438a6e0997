use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AccountError, AppError},
    models::principal::Principal,
    state::AppState,
};

/// Resolves the bearer access token into a [`Principal`] request extension.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate_request(request.headers(), &state)?;
    tracing::debug!(user_id = %principal.user_id, "request authenticated");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn authenticate_request(headers: &HeaderMap, state: &AppState) -> Result<Principal, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;

    let claims = state.tokens.verify_access_token(token)?;
    Principal::try_from(claims).map_err(|_| AppError::Account(AccountError::InvalidToken))
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(parse_bearer_token("BEARER abc"), Some("abc"));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(parse_bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(parse_bearer_token("abc"), None);
    }
}
