pub mod audit;
pub mod cache;
pub mod classifier;
pub mod combos;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod io;
pub mod orchestrator;
pub mod paths;
pub mod ranks;
pub mod review;
pub mod rules;
pub mod runner;
pub mod signals;
pub mod skillmap;
pub mod state;
pub mod stats;
pub mod suggest;
pub mod types;
pub mod usage;
pub mod workflow;

pub use error::{Result, SkillgraphError};
