mod client;
mod inference;

pub use client::LlmClient;
