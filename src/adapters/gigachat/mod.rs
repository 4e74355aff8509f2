//! GigaChat answer provider adapter.

mod client;

pub use client::{GigaChatClient, GigaChatConfig};
