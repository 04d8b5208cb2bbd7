// Shared prompt fragments for every generation call.
// Each service that needs a prompt defines its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Evidence rule appended to every candidate-facing prompt.
pub const EVIDENCE_INSTRUCTION: &str = "\
    - Use ONLY evidence from the CV text provided.\n\
    - Be conservative: if not evidenced, score lower.\n\
    - No personal attributes not present in CV.";
