pub mod request;
pub mod rule;
