//! Remote credential directory client

pub mod http_directory;

pub use http_directory::HttpCredentialDirectory;
