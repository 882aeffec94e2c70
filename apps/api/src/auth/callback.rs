//! Post-login routing: where the callback sends the browser.

use axum::http::{header, HeaderMap};

use crate::auth::identity::AccountType;
use crate::config::AppEnv;

pub const AUTH_ERROR_PATH: &str = "/auth/auth-code-error";
pub const ONBOARDING_PATH: &str = "/onboarding";
/// Cookie holding the PKCE verifier written by the frontend before redirecting to the provider.
pub const CODE_VERIFIER_COOKIE: &str = "auth-code-verifier";

const FORWARDED_HOST: &str = "x-forwarded-host";

/// Origin the redirect is built on.
///
/// Local development always uses the configured origin. Behind a reverse
/// proxy the public host arrives in `x-forwarded-host`.
pub fn redirect_base(app_env: AppEnv, public_origin: &str, headers: &HeaderMap) -> String {
    if app_env == AppEnv::Development {
        return public_origin.to_string();
    }

    match forwarded_host(headers) {
        Some(host) => format!("https://{host}"),
        None => public_origin.to_string(),
    }
}

/// First host listed in `x-forwarded-host`, if it looks like a bare host.
fn forwarded_host(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(FORWARDED_HOST)?.to_str().ok()?;
    let host = value.split(',').next()?.trim();
    let is_bare_host = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'));
    is_bare_host.then_some(host)
}

/// Role home when the account type is known, else `next` when it stays on this site.
pub fn destination_path(account_type: Option<AccountType>, next: Option<&str>) -> String {
    if let Some(account_type) = account_type {
        return account_type.home_path().to_string();
    }

    match next {
        Some(next) if is_same_site_path(next) => next.to_string(),
        _ => ONBOARDING_PATH.to_string(),
    }
}

/// "/x" is a path on this site; "//x" and "/\x" are protocol-relative URLs to another host.
fn is_same_site_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

pub fn code_verifier(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CODE_VERIFIER_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
