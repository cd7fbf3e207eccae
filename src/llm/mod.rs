// ABOUTME: LLM module - client abstraction for language model providers.
// ABOUTME: Defines message types and the provider-neutral client trait.

mod client;
mod types;

pub use client::*;
pub use types::*;

#[cfg(test)]
mod types_test;
