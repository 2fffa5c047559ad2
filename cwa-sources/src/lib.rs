pub mod raw;
pub mod schema;
pub mod source;

#[cfg(feature = "api")]
pub mod fetch;
