pub mod aggregate;
pub mod budget;
pub mod coverage;
pub mod ingest;
pub mod keyword;
pub mod model;
pub mod render;
