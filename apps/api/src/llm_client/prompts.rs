// Cross-cutting prompt fragments. Each feature keeps its own prompts.rs
// alongside it; only shared wording lives here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a JSON-only API. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that writes on the applicant's behalf.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    Only use facts present in the material provided. \
    Do NOT invent employers, degrees, metrics, or skills. \
    If a detail is missing, write around it instead of guessing.";
