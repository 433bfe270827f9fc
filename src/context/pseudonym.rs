use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of the hex prefix kept from the digest
const PSEUDONYM_LEN: usize = 16;

/// One-way keyed pseudonym for a raw user id, for log correlation only.
///
/// Never use the result for lookup or authorization.
pub fn log_safe_user_id(user_id: &str, secret: &str) -> String {
    // HMAC accepts keys of any length, including empty
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return "anonymous".to_string(),
    };
    mac.update(user_id.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("u_{}", &digest[..PSEUDONYM_LEN])
}
