use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header Meta signs webhook bodies with
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Check an `X-Hub-Signature-256: sha256=<hex>` header against the body
pub fn signature_matches(app_secret: &str, header: Option<&str>, body: &[u8]) -> bool {
    let Some(expected) = header
        .and_then(|value| value.strip_prefix("sha256="))
        .and_then(|digest| hex::decode(digest).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_signature() {
        let body = br#"{"entry":[]}"#;
        let header = sign("app-secret", body);
        assert!(signature_matches("app-secret", Some(&header), body));
    }

    #[test]
    fn test_rejects_wrong_secret_body_or_format() {
        let body = br#"{"entry":[]}"#;
        let header = sign("app-secret", body);

        assert!(!signature_matches("other-secret", Some(&header), body));
        assert!(!signature_matches("app-secret", Some(&header), b"{}"));
        assert!(!signature_matches("app-secret", None, body));
        assert!(!signature_matches("app-secret", Some("sha1=abcd"), body));
        assert!(!signature_matches("app-secret", Some("sha256=not-hex"), body));
    }
}
