//! Identity verification hashes. The widget recomputes the HMAC with the same
//! secret on its side, so only a holder of the secret can assert an identity.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::context::UserId;
use crate::errors::IntegrityError;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `subject` keyed by `secret_key`.
pub fn user_hash(secret_key: &str, subject: &str) -> Result<String, IntegrityError> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| IntegrityError::HmacFailed(format!("{e}")))?;
    mac.update(subject.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// The user id when it identifies someone, else the email.
pub fn hash_subject(user_id: Option<&UserId>, email: Option<&str>) -> Option<String> {
    match user_id {
        Some(id) if !id.is_blank() => Some(id.to_string()),
        _ => email.map(str::to_string),
    }
}
