// Cross-cutting prompt fragments. Each caller keeps its own prompts.rs next to it
// and splices these in.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Keeps rewrites faithful to what the user actually wrote.
pub const PRESERVE_FACTS_INSTRUCTION: &str = "\
    CRITICAL: Rewrite wording only. Never invent employers, titles, dates, degrees, \
    numbers, or skills that are not present in the input. \
    If a field cannot be improved, return it unchanged or omit it.";
