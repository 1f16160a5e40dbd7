//! Response rendering helpers

pub mod html;
pub mod url;

pub use url::PublicUrl;
