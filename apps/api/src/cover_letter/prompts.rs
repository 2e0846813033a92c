// LLM prompt constants for cover letters.

/// System prompt for cover letter drafting.
pub const COVER_LETTER_SYSTEM: &str = "You are a cover letter writer. \
    Fill in the placeholders of the template you are given with minimal, specific edits. \
    Keep the template structure intact. \
    Respond with the filled letter only.";

/// The letter every generation fills in. Placeholders are in braces.
pub const COVER_LETTER_TEMPLATE: &str = "{Company}

Dear Hiring Manager,

I am writing to express my interest in the {Role} position at {Company}. {MissionWhyMe}

{SkillFromInternship}

{CallToAction}

Sincerely,
[Your Name]";

/// Replace `{company}`, `{role}`, `{jd_excerpt}`, `{template}` and `{rules}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Fill in the cover letter template below for this job.

Replace:
- {Company} with: {company}
- {Role} with: {role}
- {MissionWhyMe} with: 1-2 sentences about why the applicant is interested and a good fit
- {SkillFromInternship} with: 1-2 sentences highlighting a relevant skill or experience
- {CallToAction} with: 1 sentence expressing enthusiasm and next steps

{rules}

Template:
{template}

Job Description:
{jd_excerpt}

Return ONLY the filled template, no additional text."#;
