//! Shared access signature generation.
//!
//! Token format:
//! `SharedAccessSignature sr=<uri>&sig=<signature>&se=<expiry>&skn=<key name>`
//! where the signature is base64(HMAC-SHA256(key, "<uri>\n<expiry>")) and
//! `<uri>` is the url-encoded resource URI.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded::byte_serialize;

use crate::azure::connection::Credential;
use crate::azure::types::{ClientError, ClientResult};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of generated tokens.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Generate a token for `resource_uri` that expires at `expiry` (unix seconds).
pub fn generate_token(resource_uri: &str, key_name: &str, key: &str, expiry: u64) -> ClientResult<String> {
    let encoded_uri = encode(resource_uri);
    let string_to_sign = format!("{}\n{}", encoded_uri, expiry);

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| ClientError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
        encoded_uri,
        encode(&signature),
        expiry,
        encode(key_name)
    ))
}

/// Authorization header value for a request against `resource_uri`.
pub fn authorization(credential: &Credential, resource_uri: &str) -> ClientResult<String> {
    match credential {
        Credential::SharedAccessSignature(token) => Ok(token.clone()),
        Credential::SharedAccessKey { name, key } => {
            let expiry = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .saturating_add(TOKEN_LIFETIME)
                .as_secs();
            generate_token(resource_uri, name, key, expiry)
        }
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
