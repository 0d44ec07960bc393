//! Destination validation and masking utilities

pub mod email;
pub mod phone;

// Re-export commonly used utilities
pub use email::{is_valid_email, mask_email};
pub use phone::{is_valid_phone, mask_phone_number};
