pub mod cancel;
pub mod interpolate;
pub mod osrm;
pub mod plan;
pub mod schedule;
pub mod source;
