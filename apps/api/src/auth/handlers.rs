//! Axum route handler for the OAuth callback.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::callback::{code_verifier, destination_path, redirect_base, AUTH_ERROR_PATH};
use crate::auth::identity::AccountType;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    /// Account type chosen on the sign-up screen.
    pub user_type: Option<String>,
    pub next: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /auth/callback
///
/// Exchanges the authorization code, records the account type if one was
/// chosen, and redirects to the role's home. Every failure redirects to the
/// auth error page.
pub async fn handle_auth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Redirect {
    let base = redirect_base(state.config.app_env, &state.config.public_origin, &headers);
    let error_redirect = Redirect::temporary(&format!("{base}{AUTH_ERROR_PATH}"));

    if let Some(err) = &params.error {
        warn!(
            "Identity provider returned error '{err}': {}",
            params.error_description.as_deref().unwrap_or("")
        );
        return error_redirect;
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        warn!("Auth callback called without a code");
        return error_redirect;
    };

    let Some(identity) = state.identity.as_ref() else {
        error!("Configuration error: SUPABASE_URL / SUPABASE_ANON_KEY are not set");
        return error_redirect;
    };

    let session = match identity
        .exchange_code(code, code_verifier(&headers).as_deref())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!("Code exchange failed: {e}");
            return error_redirect;
        }
    };

    let stored = session.user.account_type();
    let requested = params.user_type.as_deref().and_then(AccountType::parse);

    if let Some(requested) = requested.filter(|r| Some(*r) != stored) {
        if let Err(e) = identity.update_user_type(&session, requested).await {
            warn!(user_id = %session.user.id, "Failed to store account type: {e}");
        }
    }

    let account_type = requested.or(stored);
    let path = destination_path(account_type, params.next.as_deref());
    info!(
        user_id = %session.user.id,
        account_type = account_type.map(|t| t.as_str()).unwrap_or("unknown"),
        "Login completed, redirecting to {path}"
    );

    Redirect::temporary(&format!("{base}{path}"))
}
