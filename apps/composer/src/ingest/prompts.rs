// Ingestion LLM prompt templates.

pub const INGEST_SYSTEM: &str = "\
You are a precise resume data extractor. \
Read the text of an existing resume and return its contents as structured JSON. \
You MUST respond with valid JSON only. No markdown fences, no explanations. \
Copy wording as written; never invent employers, dates, degrees, or skills. \
Omit any field that is not present in the text.";

pub const INGEST_PROMPT: &str = r#"Extract the following resume text into a structured JSON object.

RESUME TEXT:
{raw_text}

OUTPUT SCHEMA (every key is optional; omit what is missing):
{
  "contact": {
    "full_name": "string",
    "headline": "string",
    "email": "string",
    "phone": "string",
    "location": "string",
    "website": "string"
  },
  "summary": "string",
  "experience": [
    {
      "title": "string",
      "company": "string",
      "location": "string",
      "start_date": "string",
      "end_date": "string (empty when current)",
      "description": "one achievement per line"
    }
  ],
  "education": [
    {
      "degree": "string",
      "institution": "string",
      "start_date": "string",
      "end_date": "string",
      "details": "string"
    }
  ],
  "skills": [
    { "category": "string", "items": ["string"] }
  ]
}

Return ONLY the JSON object."#;
