//! Inbound webhook authentication.

mod signature;

pub use signature::{
    compute_signature, signature_header, SignatureError, SignatureHeader, SignatureVerifier,
    SIGNATURE_HEADER,
};
