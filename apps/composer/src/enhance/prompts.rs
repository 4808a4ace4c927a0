// Enhancement prompt templates.

pub const ENHANCE_SYSTEM: &str = "\
You are an expert resume and cover letter editor. \
You rewrite the user's own content to be clearer and more compelling. \
You MUST respond with a single JSON object only. No markdown fences, no explanations.";

pub const RESUME_PROMPT_TEMPLATE: &str = r#"Rewrite the following resume content.

{preserve_facts}

TONE:
{tone_json}

CONTENT:
{content_json}

OUTPUT SCHEMA (return exactly this structure; keep entries in the same order as the input):
{
  "summary": "string",
  "experience": [
    {"title": "string", "company": "string", "description": "one achievement per line"}
  ],
  "education": [
    {"degree": "string", "institution": "string", "details": "string"}
  ],
  "skills": [
    {"category": "string", "items": ["string"]}
  ]
}
"#;

pub const LETTER_PROMPT_TEMPLATE: &str = r#"Rewrite the body of the following cover letter.

{preserve_facts}

TONE:
{tone_json}

CONTENT:
{content_json}

OUTPUT SCHEMA (return exactly this structure):
{
  "body": "string, paragraphs separated by blank lines"
}
"#;
