pub mod hash;
pub mod telemetry;
pub mod uuid;
