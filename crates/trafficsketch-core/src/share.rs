//! Shareable link encoding.
//!
//! A scene travels in the URL fragment as `#s=<token>`, where the token is
//! the base64 of the UTF-8 JSON item list. Only the item list is carried;
//! viewport, selection and history stay behind.

use crate::scene::Scene;
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use thiserror::Error;

/// Fragment prefix marking a shared scene.
pub const SHARE_PREFIX: &str = "s=";

/// Errors reading a shared fragment.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Fragment does not carry a shared scene")]
    MissingPrefix,
    #[error("Invalid base64 token: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Token is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid scene payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a scene as a fragment body, without the leading `#`.
pub fn encode_fragment(scene: &Scene) -> Result<String, serde_json::Error> {
    let json = scene.to_json()?;
    Ok(format!("{SHARE_PREFIX}{}", STANDARD.encode(json.as_bytes())))
}

/// Decode a fragment produced by [`encode_fragment`].
///
/// The leading `#` is optional. Tokens in the URL-safe base64 alphabet are
/// accepted too, since some chat clients rewrite `+` and `/`.
pub fn decode_fragment(fragment: &str) -> Result<Scene, ShareError> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let token = fragment.strip_prefix(SHARE_PREFIX).ok_or(ShareError::MissingPrefix)?;
    let token = token.trim();
    let bytes = match STANDARD.decode(token) {
        Ok(bytes) => bytes,
        Err(err) => URL_SAFE.decode(token).map_err(|_| err)?,
    };
    let json = String::from_utf8(bytes)?;
    Ok(Scene::from_json(&json)?)
}

/// Whether a fragment claims to carry a shared scene.
pub fn is_share_fragment(fragment: &str) -> bool {
    fragment.strip_prefix('#').unwrap_or(fragment).starts_with(SHARE_PREFIX)
}

/// Full shareable URL: `base` with any existing fragment replaced.
pub fn share_url(base: &str, scene: &Scene) -> Result<String, serde_json::Error> {
    let base = base.split('#').next().unwrap_or(base);
    Ok(format!("{base}#{}", encode_fragment(scene)?))
}

/// Extract the fragment (without `#`) from a URL, if it has one.
pub fn fragment_of(url: &str) -> Option<&str> {
    url.split_once('#').map(|(_, fragment)| fragment)
}
