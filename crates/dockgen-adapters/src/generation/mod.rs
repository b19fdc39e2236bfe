//! Generation API adapters.

mod openai;

pub use openai::{OpenAiClient, OpenAiSettings};
