//! OpenAI-style chat completions backed by IBM watsonx Granite text generation
//!
//! Exchanges an IBM Cloud API key for an IAM bearer token, flattens chat
//! messages into Granite's role-marker prompt format, and reshapes the
//! generated text into a `chat.completion` object.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;

pub use error::{Error, Result};
