pub mod adapters;
pub mod config;
pub mod genesis;
pub mod logging;
pub mod wiring;
