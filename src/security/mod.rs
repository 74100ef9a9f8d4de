pub mod reference;
pub mod webhook;

pub use reference::{ReferenceCodec, SecureReference};
pub use webhook::{sign_body, verify_signature, SignatureValidation, SIGNATURE_HEADER};
