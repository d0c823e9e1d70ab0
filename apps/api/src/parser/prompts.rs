// All LLM prompt constants for the parser module.
//
// The schema embedded in the template below is the single source of truth
// for the output shape the rest of the pipeline expects. An earlier flat
// 6-field schema is superseded by this nested one; do not reintroduce it.

/// Resume parsing prompt template. Replace `{resume_text}` before sending.
/// The source text must already be truncated to the input budget.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"You are a resume parser. Given the following resume text, extract the data into this exact JSON format:

{
  "personal_info": {
    "name": "",
    "email": "",
    "phone": "",
    "location": "",
    "linkedin": "",
    "website": ""
  },
  "summary": "",
  "education": [
    {
      "institution": "",
      "degree": "",
      "field_of_study": "",
      "start_date": "",
      "end_date": "",
      "grade": ""
    }
  ],
  "work_experience": [
    {
      "company": "",
      "title": "",
      "location": "",
      "start_date": "",
      "end_date": "",
      "responsibilities": []
    }
  ],
  "skills": [],
  "projects": [
    {
      "name": "",
      "description": "",
      "technologies": []
    }
  ],
  "certifications": [
    {
      "name": "",
      "issuer": "",
      "year": ""
    }
  ],
  "languages": [],
  "references": [
    {
      "name": "",
      "relationship": "",
      "contact": ""
    }
  ],
  "years_of_experience": 0,
  "additional_info": ""
}

Instructions:
1. Extract contact information (name, email, phone, location, profile links) into personal_info.
2. Split skills into an array of individual skill strings.
3. Parse references into the references array if any are present.
4. Estimate years_of_experience from the role timelines in work_experience.
5. Put any content that does not fit the fields above into additional_info.
6. Return exactly ONE JSON object. No commentary, no markdown code fences.
7. If a field is ambiguous or missing, leave it empty. Do NOT omit fields.

Resume Text:
"{resume_text}"
"#;
