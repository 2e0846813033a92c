/// Span segmentation prompt. Replace `{jd_text}` before sending.
pub const SPAN_SEGMENTATION_PROMPT_TEMPLATE: &str = r#"Segment the job description below into three kinds of sections and return character offsets.

Return ONLY a JSON object of this exact shape:
{
  "requirements": [[start, end], ...],
  "responsibilities": [[start, end], ...],
  "nice_to_haves": [[start, end], ...]
}

Rules:
- Offsets are zero-based character indices into the text exactly as given, end exclusive.
- "requirements" are required qualifications, "responsibilities" are duties of the role,
  "nice_to_haves" are preferred or bonus qualifications.
- Omit sections that do not exist. Do not return text, only offsets.

Job description:
{jd_text}"#;
