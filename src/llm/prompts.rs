// src/llm/prompts.rs

pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are an assistant that extracts structured data from job descriptions in JSON format.";

pub const RESUME_SYSTEM_PROMPT: &str = "You are an assistant that formats resumes.";

pub const FIT_SYSTEM_PROMPT: &str = "You are a career advisor analyzing job fit.";

pub const RESUME_START: &str = "---RESUME-START---";
pub const RESUME_END: &str = "---RESUME-END---";

pub fn job_extraction_prompt(job_description: &str) -> String {
    format!(
        r#"Analyze the job description below and extract the following details in a structured JSON format. Use a step-by-step reasoning process to ensure accuracy.

Details to extract:
- Job title
- Skills (required and preferred, as lists of concise technical skill names)
- Experience (years required, list of responsibilities)
- Education (degree and field)
- Certifications (list of required certifications)
- Other requirements (e.g., location, soft skills)

For the skills section:
- Extract only specific technical skills, programming languages, frameworks, tools, platforms, and technologies (e.g., 'Python', 'AWS', 'Docker').
- List each skill as a concise string, splitting combined skills into individual items (e.g., 'Python, FastAPI, ORM' becomes ['Python', 'FastAPI', 'ORM']).
- Exclude non-technical skills (e.g., 'problem-solving', 'teamwork', 'Agile/Scrum') and descriptive phrases.
- Categorize skills as 'required' or 'preferred' based on the job description's explicit sections.

Job Description:
{}

Output only the JSON object:
{{
    "title": str,
    "skills": {{"required": [str], "preferred": [str]}},
    "experience": {{"years": float or null, "responsibilities": [str]}},
    "education": {{"degree": str or null, "field": str or null}},
    "certifications": [str],
    "other_requirements": [str]
}}"#,
        job_description
    )
}

pub fn resume_format_prompt(raw_text: &str) -> String {
    format!(
        "Format the following resume text into a clear, structured plain-text outline. \
         Don't assume or add anything by yourself. \
         Return resume between the following dividers: '{}' and '{}'\n\n{}",
        RESUME_START, RESUME_END, raw_text
    )
}

pub fn job_fit_prompt(job_posting: &str, resume: &str) -> String {
    format!(
        r#"JOB POSTING:
{}

CANDIDATE RESUME:
{}

TASK: Analyze how well the candidate's resume aligns with this job posting. Provide:

1. **Key Strengths** - What aspects of the candidate's background directly match the job requirements
2. **Relevant Experience** - Specific experiences that demonstrate capability for this role
3. **Potential Gaps** - Areas where additional development might be beneficial
4. **Overall Fit Score** - Rate 1-10 with brief justification
5. **Interview Tips** - 3 specific talking points to emphasize during interviews

Keep the analysis concise, actionable, and professional."#,
        job_posting, resume
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_their_input() {
        assert!(job_extraction_prompt("Build APIs in Rust").contains("Build APIs in Rust"));
        assert!(job_extraction_prompt("x").contains(r#""skills": {"required": [str]"#));

        let resume = resume_format_prompt("Jane Doe");
        assert!(resume.contains("'---RESUME-START---' and '---RESUME-END---'"));
        assert!(resume.ends_with("\n\nJane Doe"));

        let fit = job_fit_prompt("Engineer at Acme", "Jane Doe");
        assert!(fit.contains("JOB POSTING:\nEngineer at Acme"));
        assert!(fit.contains("CANDIDATE RESUME:\nJane Doe"));
    }
}
