pub mod health;
pub mod index;
pub mod stats;
pub mod transcribe;
