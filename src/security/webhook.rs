use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureValidation {
    Valid,
    Missing,
    Invalid,
}

impl SignatureValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Missing => "Signature header missing",
            Self::Invalid => "Invalid signature",
        }
    }
}

/// Signs a webhook body the way the LINE platform does: base64(HMAC-SHA256(secret, body)).
pub fn sign_body(channel_secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(channel_secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

pub fn verify_signature(
    channel_secret: &str,
    body: &[u8],
    signature_header: Option<&str>,
) -> SignatureValidation {
    let Some(signature) = signature_header.filter(|s| !s.is_empty()) else {
        return SignatureValidation::Missing;
    };

    let Ok(expected) = BASE64.decode(signature.trim()) else {
        return SignatureValidation::Invalid;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return SignatureValidation::Invalid;
    };
    mac.update(body);

    // verify_slice compares in constant time
    if mac.verify_slice(&expected).is_ok() {
        SignatureValidation::Valid
    } else {
        SignatureValidation::Invalid
    }
}
