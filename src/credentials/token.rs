//! Tenant access token exchange.

use crate::cache::{get_or_fetch, CacheKey, CacheStore, Fetched};
use crate::config::{Config, LarkAppCredentials};
use crate::error::{DispatchError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Seconds shaved off the declared expiry before caching a token.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 600;
/// Lower bound on the cached lifetime of a token.
pub const MIN_TOKEN_TTL_SECS: i64 = 60;

const TOKEN_PATH: &str = "/auth/v3/tenant_access_token/internal";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: String,
    #[serde(default)]
    expire: i64,
}

/// Cache lifetime for a token the remote declared valid for `declared_secs`.
pub fn token_ttl(declared_secs: i64) -> Duration {
    let secs = declared_secs.saturating_sub(TOKEN_SAFETY_MARGIN_SECS);
    let secs = if secs <= 0 { MIN_TOKEN_TTL_SECS } else { secs };
    Duration::from_secs(secs as u64)
}

/// Returns a tenant token for `app`, exchanging the app credentials only when
/// the cache has no live token for them.
#[instrument(skip_all, fields(app_id = %app.app_id))]
pub async fn get_access_token(
    http: &reqwest::Client,
    cache: &dyn CacheStore,
    config: &Config,
    app: &LarkAppCredentials,
) -> Result<String> {
    let key = CacheKey::Token {
        app_id: &app.app_id,
        app_secret: &app.app_secret,
    };
    get_or_fetch(cache, &key, config.cache.write_failure, || {
        exchange(http, &config.endpoints.lark_api_base, app)
    })
    .await
}

async fn exchange(http: &reqwest::Client, api_base: &str, app: &LarkAppCredentials) -> Result<Fetched> {
    let url = format!("{}{}", api_base.trim_end_matches('/'), TOKEN_PATH);
    info!("Exchanging app credentials for a tenant token");

    let response = http
        .post(&url)
        .json(&json!({ "app_id": app.app_id, "app_secret": app.app_secret }))
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "Token exchange request failed");
            DispatchError::RemoteAuth(e.to_string())
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        error!(status = %status, "Token exchange rejected");
        return Err(DispatchError::RemoteAuth(format!("token endpoint response: {}", status)));
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| DispatchError::RemoteAuth(format!("malformed token response: {e}")))?;

    if body.code != 0 {
        error!(code = body.code, msg = %body.msg, "Token exchange returned an error code");
        return Err(DispatchError::RemoteAuth(format!("lark token error: {}", body.msg)));
    }
    if body.tenant_access_token.is_empty() {
        return Err(DispatchError::RemoteAuth(
            "token response carried no token".to_string(),
        ));
    }

    Ok(Fetched::expiring(body.tenant_access_token, token_ttl(body.expire)))
}
