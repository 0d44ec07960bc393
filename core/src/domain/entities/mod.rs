//! Domain entities.

pub mod channel;
pub mod credential;
pub mod verification_code;

pub use channel::Channel;
pub use credential::{AuthCredential, UserInfo};
pub use verification_code::IssuedCode;
