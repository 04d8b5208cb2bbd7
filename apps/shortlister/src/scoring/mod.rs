// Scoring pipeline: must-have gate, keyword, semantic, rubric and bonus/malus signals,
// combined into a weighted total and ranked.
// All model calls go through llm_client traits; nothing here talks HTTP.

pub mod aggregate;
pub mod bonus_malus;
pub mod config;
pub mod gate;
pub mod keywords;
pub mod pipeline;
pub mod prompts;
pub mod rubric;
pub mod semantic;
pub mod text;
