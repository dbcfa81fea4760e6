pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod monte_carlo;
pub mod output;
pub mod request;
pub mod rng;
pub mod state;
pub mod station;
pub mod stats;
pub mod validation;
