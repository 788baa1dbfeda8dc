//! Request authentication
//!
//! Every authenticated call is signed over the canonical string
//! `lowercase(method) + "|" + url + "|" + body`, where `body` is
//! byte-identical to what is transmitted. The server recomputes the same
//! string and checks the signature against the copayer's registered key.
//! Bootstrap requests (wallet registration, joining) are sent before a
//! copayer is registered and are unsigned by design.

use covault_crypto::KeyPair;
use covault_types::Result;

/// Body stand-in for signed requests that carry no payload.
pub const EMPTY_BODY: &str = "{}";

/// Build the canonical string a request signature covers.
pub fn canonical_request(method: &str, url: &str, body: &str) -> String {
    format!("{}|{}|{}", method.to_lowercase(), url, body)
}

/// Sign a request with the copayer's request key; returns a hex signature.
pub fn sign_request(method: &str, url: &str, body: &str, key: &KeyPair) -> Result<String> {
    let message = canonical_request(method, url, body);
    key.sign(message.as_bytes()).map_err(Into::into)
}

/// Verify a request signature; used by tests standing in for the server.
pub fn verify_request(
    method: &str,
    url: &str,
    body: &str,
    signature_hex: &str,
    public_key_hex: &str,
) -> bool {
    let message = canonical_request(method, url, body);
    covault_crypto::verify(message.as_bytes(), signature_hex, public_key_hex)
}
