pub mod kubernetes;
pub mod observability;
