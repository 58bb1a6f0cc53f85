//! Pocket API endpoint table. All calls are POSTs against the v3 surface;
//! the consent page lives outside it.

pub const BASE_URL: &str = "https://getpocket.com/v3";

pub const OAUTH_REQUEST: &str = "/oauth/request";
pub const OAUTH_AUTHORIZE: &str = "/oauth/authorize";
pub const GET: &str = "/get";
pub const ADD: &str = "/add";
pub const SEND: &str = "/send";

/// Browser consent page for a pending request token.
pub fn authorize_url(request_token: &str, redirect_uri: &str) -> String {
    let redirect: String = url::form_urlencoded::byte_serialize(redirect_uri.as_bytes()).collect();
    format!(
        "https://getpocket.com/auth/authorize?request_token={request_token}&redirect_uri={redirect}"
    )
}
