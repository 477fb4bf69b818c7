// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it and builds its system prompts from these.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction shared by every extraction prompt.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Extract only what the document states. Do NOT infer, embellish, or invent \
    skills, dates, or degrees. If a field is not present, use null or an empty list.";

/// Builds a system prompt: a role sentence followed by the JSON-only rules.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}
