//! Prompt template for the optimization call. Placeholders are filled by
//! `pipeline::optimizer::build_optimization_prompt`.

pub const OPTIMIZATION_PROMPT_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) resume optimizer and career coach with 10+ years of experience helping professionals land their dream jobs.

TASK: Rewrite and optimize the following resume to maximize ATS compatibility and job match for the specific role.

TONE REQUIREMENT: {tone_instruction}

JOB DESCRIPTION:
{job_description}

ORIGINAL RESUME:
{resume_text}

OPTIMIZATION REQUIREMENTS:
1. Use keywords from the job description naturally throughout the resume
2. Quantify achievements with specific numbers, percentages, and metrics
3. Use strong action verbs (Led, Developed, Implemented, Increased, etc.)
4. Ensure ATS-friendly formatting (no tables, simple layout)
5. Match the tone specified: {tone}
6. Keep content truthful but enhance impact and relevance
7. Focus on experience most relevant to this specific role
8. Include a compelling professional summary
9. Organize sections logically: Contact, Summary, Experience, Skills, Education
10. Remove any irrelevant information that doesn't support the target role

OUTPUT FORMAT:
Provide the optimized resume in the following structure:

**CONTACT INFORMATION**
[Name, Email, Phone, Location, LinkedIn (if available)]

**PROFESSIONAL SUMMARY**
[2-3 sentences highlighting key qualifications and value proposition for this specific role]

**PROFESSIONAL EXPERIENCE**
[Each role with: Job Title | Company | Dates, then 3-4 bullet points with quantified achievements]

**KEY SKILLS**
[Relevant technical and soft skills from job description, organized by category]

**EDUCATION**
[Degree, Institution, Year, relevant coursework or achievements if applicable]

Generate the complete optimized resume now:"#;
