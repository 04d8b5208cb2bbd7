// Job description parsing: JD text → structured requirements, plus the
// scoring-config sections they suggest.

pub mod handlers;
pub mod parser;
pub mod prompts;
