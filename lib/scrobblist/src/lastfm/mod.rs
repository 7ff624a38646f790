mod client;
mod models;

pub use client::{LastFmClient, LastFmClientBuilder};
