// All LLM prompt constants for the ATS module.
// System prompts are built with `llm_client::prompts::json_system`.

pub const JD_PARSE_ROLE: &str = "You are an expert recruiter who turns job postings into \
    structured requirements for an applicant tracking system.";

/// Replace `{no_invention}` and `{jd_text}` before sending.
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"Parse the following job description.

{no_invention}

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Software Engineering Intern",
  "company": "Acme Corp" | null,
  "required_skills": ["Python", "SQL"],
  "preferred_skills": ["Docker"],
  "responsibilities": ["Build internal REST APIs used by the payments team"],
  "education": {
    "minimum_degree": "Bachelor's degree" | null,
    "fields_of_study": ["Computer Science"],
    "is_required": true
  },
  "min_years_experience": 1 | null,
  "employment_type": "internship" | "full_time" | "part_time" | "contract" | null
}

Rules:
- REQUIRED skills: phrases like "required", "must have", "you have", "minimum qualifications".
- PREFERRED skills: "preferred", "nice to have", "bonus", "a plus", "preferred qualifications".
- Skills are short names of languages, frameworks, tools, platforms, or methods ("React", "AWS", "Agile"), never full sentences.
- Responsibilities are what the hire will DO, one per item, copied or lightly condensed from the posting.
- education.is_required is false when the degree is only preferred ("or equivalent experience" counts as preferred).
- min_years_experience is the smallest number of years explicitly requested, else null.

JOB DESCRIPTION:
{jd_text}"#;

pub const RESUME_NORMALIZE_ROLE: &str = "You are a meticulous resume parser for an applicant \
    tracking system.";

/// Replace `{no_invention}` and `{resume_text}` before sending.
pub const RESUME_NORMALIZE_PROMPT_TEMPLATE: &str = r#"Normalize the following resume into structured JSON.

{no_invention}

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Jane Doe" | null,
  "skills": ["Python", "React", "PostgreSQL"],
  "certifications": ["AWS Certified Cloud Practitioner"],
  "experience": [
    {
      "title": "Software Engineering Intern",
      "organization": "Acme Corp" | null,
      "start_date": "2024-05" | null,
      "end_date": "2024-08" | "Present" | null,
      "bullets": ["Built a React dashboard used by 40 analysts"],
      "technologies": ["React", "TypeScript"]
    }
  ],
  "education": [
    {
      "institution": "State University",
      "degree": "B.S." | null,
      "field_of_study": "Computer Science" | null,
      "graduation_date": "2026-05" | null,
      "in_progress": true
    }
  ],
  "total_years_experience": 0.5
}

Rules:
- skills: every technical or professional skill listed anywhere, as short names.
- experience includes jobs, internships, research positions, and substantial projects with dates.
- Dates use "YYYY-MM" when a month is given, "YYYY" otherwise; ongoing roles use "Present".
- in_progress is true when the degree has an expected or future graduation date.
- total_years_experience sums non-overlapping professional experience in years (0 if none).

RESUME:
{resume_text}"#;

pub const RESPONSIBILITY_MATCH_ROLE: &str = "You are a strict hiring reviewer who checks whether \
    a resume demonstrates each responsibility of a job posting.";

/// Replace `{responsibilities_json}` and `{resume_json}` before sending.
pub const RESPONSIBILITY_MATCH_PROMPT_TEMPLATE: &str = r#"For EACH responsibility below, decide whether the resume demonstrates it.

RESPONSIBILITIES (JSON array, keep the exact strings):
{responsibilities_json}

RESUME (structured JSON):
{resume_json}

Return a JSON object:
{
  "matches": [
    {
      "responsibility": "exact string from the list above",
      "status": "met" | "partial" | "not_met",
      "evidence": "short quote or paraphrase from the resume" | null
    }
  ]
}

Rules:
- "met": the resume shows the candidate has done this or something directly equivalent.
- "partial": related work exists but at smaller scope, different context, or only coursework.
- "not_met": no supporting evidence. Evidence must be null.
- Return exactly one entry per responsibility, in the same order. Do not merge or split items."#;
