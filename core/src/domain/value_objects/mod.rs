//! Value objects exchanged with callers.

pub mod certificate_outcome;
pub mod verification_request;

pub use certificate_outcome::CertificateOutcome;
pub use verification_request::VerificationRequest;
