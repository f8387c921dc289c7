pub mod geo;
pub mod mover;
pub mod trip;
