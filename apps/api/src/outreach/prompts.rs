// LLM prompt constants for outreach messages.

/// System prompt for LinkedIn DM drafting.
pub const DM_SYSTEM: &str = "You write brief, professional LinkedIn direct messages. \
    Keep them under 300 characters and within LinkedIn's terms of service. \
    Respond with the message text only.";

/// Replace `{name}`, `{context}` and `{rules}` before sending.
pub const DM_PROMPT_TEMPLATE: &str = r#"Write a brief, professional LinkedIn DM for outreach.
Recipient: {name}
{context}

Keep it:
- Under 300 characters
- Professional but friendly
- Focused on connecting, not selling

{rules}

Return ONLY the message text, no subject line or signature."#;
