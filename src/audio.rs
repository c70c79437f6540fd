pub mod cue;
pub mod filter;
