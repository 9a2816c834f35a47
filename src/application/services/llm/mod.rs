//! Prompt construction for the dialogue model

pub mod prompt_builder;
