pub mod health;
pub mod trips;
