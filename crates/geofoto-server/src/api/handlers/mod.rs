pub mod data;
pub mod edge;
pub mod health;
pub mod stats;
