// Prompt constants for the definition generation call.
// The user message is always the composed prompt; only the system text lives here.

/// System prompt for definition generation. Enforces a bare, single-sentence answer.
pub const DEFINITION_SYSTEM: &str = "You are a careful legal drafter. \
    Follow the instruction you are given exactly. \
    Respond with the definition text only: no label, no quotation marks, \
    no markdown and no commentary.";

/// Labels a model sometimes puts in front of the definition despite instructions.
pub const DEFINITION_LABELS: &[&str] = &["definition:", "definitie:"];
