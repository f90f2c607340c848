//! Collection-level pre-request script for bearer token handling
//!
//! The script runs inside Postman before every request sent through the
//! generated collection. It reuses the cached `jwt_token` until it is within
//! [`EXPIRY_BUFFER_SECS`] of `jwt_expiry`, otherwise performs an OAuth2
//! client-credentials exchange against `{{auth_url}}/oauth/token` and caches
//! the new token with its absolute expiry.

use crate::postman::{Event, Script};

/// Refresh this many seconds before the cached token expires
pub const EXPIRY_BUFFER_SECS: u64 = 60;

/// Token lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Environment variables the script requires before it can fetch a token
pub const REQUIRED_VARIABLES: [&str; 3] = ["auth_url", "client_id", "client_secret"];

const SCRIPT_TEMPLATE: &str = r#"// Bearer token cache for client-credentials auth.
// Requires environment variables: auth_url, client_id, client_secret.
// Maintains: jwt_token, jwt_expiry (unix seconds).

const EXPIRY_BUFFER = __EXPIRY_BUFFER__;
const DEFAULT_LIFETIME = __DEFAULT_LIFETIME__;
const now = Math.floor(Date.now() / 1000);
const cachedToken = pm.environment.get("jwt_token");
const expiry = Number(pm.environment.get("jwt_expiry") || 0);

if (cachedToken && now < expiry - EXPIRY_BUFFER) {
    console.log("Using cached token, expires in", expiry - now, "seconds");
    return;
}

const missing = [__REQUIRED__].filter((name) => !pm.environment.get(name));
if (missing.length > 0) {
    throw new Error("Missing authentication configuration: " + missing.join(", "));
}

let response;
try {
    response = await pm.sendRequest({
        url: pm.environment.get("auth_url") + "/oauth/token",
        method: "POST",
        header: { "Content-Type": "application/x-www-form-urlencoded" },
        body: {
            mode: "urlencoded",
            urlencoded: [
                { key: "grant_type", value: "client_credentials" },
                { key: "client_id", value: pm.environment.get("client_id") },
                { key: "client_secret", value: pm.environment.get("client_secret") }
            ]
        }
    });
} catch (err) {
    throw new Error("Authentication failed: " + err);
}

if (response.code !== 200) {
    throw new Error("Authentication failed: HTTP " + response.code);
}

const data = response.json();
if (!data.access_token) {
    throw new Error("Authentication failed: token response has no access_token");
}

const lifetime = data.expires_in || DEFAULT_LIFETIME;
pm.environment.set("jwt_token", data.access_token);
pm.environment.set("jwt_expiry", now + lifetime);
console.log("Token refreshed, expires in", lifetime, "seconds");"#;

/// Full JavaScript source of the pre-request script.
pub fn prerequest_source() -> String {
    let required = REQUIRED_VARIABLES
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ");

    SCRIPT_TEMPLATE
        .replace("__EXPIRY_BUFFER__", &EXPIRY_BUFFER_SECS.to_string())
        .replace("__DEFAULT_LIFETIME__", &DEFAULT_TOKEN_LIFETIME_SECS.to_string())
        .replace("__REQUIRED__", &required)
}

/// The script as a collection `prerequest` event.
pub fn prerequest_event() -> Event {
    Event {
        listen: "prerequest".to_string(),
        script: Script {
            script_type: "text/javascript".to_string(),
            exec: prerequest_source().lines().map(str::to_string).collect(),
        },
    }
}
