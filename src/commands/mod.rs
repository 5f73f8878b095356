pub mod aggregate;
pub mod inspect;
pub mod shrink;
