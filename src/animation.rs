pub mod ease;
pub mod scheduler;
