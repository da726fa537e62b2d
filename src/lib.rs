pub mod algorithms;
pub mod config;
pub mod customer;
pub mod engine;
pub mod error;
pub mod events;
pub mod facility;
pub mod generators;
pub mod models;
pub mod observer;
pub mod output;
pub mod queue;
pub mod state;
pub mod stats;
pub mod teller;
