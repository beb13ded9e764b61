pub mod audit;
pub mod cache;
pub mod combos;
pub mod config;
pub mod map;
pub mod orchestrate;
pub mod ranks;
pub mod stats;
pub mod suggest;
