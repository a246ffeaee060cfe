use crate::types::{BookRequest, CourseRequest, OutcomeRequest, SyllabusSubmission};

/// Appended to every prompt; models follow it most of the time, the parser handles the rest
pub const JSON_ONLY_SUFFIX: &str = "Please respond with a valid JSON object and nothing else. No explanations or text outside the JSON.";

pub fn create_course_prompt(request: &CourseRequest) -> String {
    let mut prompt = format!(
        "You are an academic course designer. Design a university-level 5-module course with labs, outcomes, and textbook references.

Input:
- Title: {}
- Credits: {}
- L:T:P = {}
- Audience: {}
",
        request.title, request.credits, request.ltp, request.audience
    );

    prompt.push_str(
        r#"
Output a JSON object with the following structure:
{
    "modules": [
        {
            "title": "Module Title",
            "hours": 8,
            "description": "Detailed description of the module content"
        }
    ],
    "outcomes": [
        {
            "text": "Measurable learning outcome",
            "bloom_level": "Remember|Understand|Apply|Analyze|Evaluate|Create",
            "description": "Explanation of the outcome"
        }
    ],
    "labs": [
        {
            "title": "Lab Title",
            "module": "Module number (1-5)",
            "description": "Lab description",
            "duration": "2 hours"
        }
    ],
    "textbooks": [
        {
            "title": "Book Title",
            "author": "Author Name",
            "year": "2023",
            "isbn": "ISBN number if available"
        }
    ],
    "references": [
        {
            "title": "Online Resource Title",
            "url": "https://example.com",
            "description": "Brief description"
        }
    ]
}

Ensure:
- Exactly 5 modules with realistic hours distribution
- 4 measurable outcomes with proper Bloom's taxonomy levels
- 5-6 labs mapped to specific modules
- 3 textbooks and 3 online references
"#,
    );
    prompt.push_str(&format!(
        "- All content is appropriate for {}\n\n{JSON_ONLY_SUFFIX}",
        request.audience
    ));
    prompt
}

pub fn create_outcome_prompt(request: &OutcomeRequest) -> String {
    let mut prompt = format!(
        "Analyze this learning outcome for quality and alignment with Bloom's Taxonomy:

Outcome: \"{}\"
",
        request.outcome
    );

    prompt.push_str(
        r#"
Provide a JSON response with:
{
    "current_bloom_level": "Remember|Understand|Apply|Analyze|Evaluate|Create",
    "quality_score": 1-10,
    "strengths": ["List of strengths"],
    "weaknesses": ["List of weaknesses"],
    "suggested_improvements": ["List of specific improvements"],
    "improved_outcome": "The improved version of the outcome"
}

"#,
    );
    prompt.push_str(JSON_ONLY_SUFFIX);
    prompt
}

pub fn create_syllabus_prompt(submission: &SyllabusSubmission) -> String {
    let mut prompt = format!(
        "Analyze this course syllabus for quality, completeness, and alignment with educational best practices:

Syllabus Content:
{}
",
        submission.content
    );

    prompt.push_str(
        r#"
Provide a JSON response with:
{
    "overall_score": 1-10,
    "completeness_score": 1-10,
    "bloom_alignment": 1-10,
    "strengths": ["List of strengths"],
    "weaknesses": ["List of weaknesses"],
    "missing_elements": ["List of missing elements"],
    "recommendations": ["List of specific recommendations"],
    "outcome_analysis": [
        {
            "outcome": "Outcome text",
            "bloom_level": "Detected level",
            "quality": "Good|Fair|Poor",
            "suggestion": "Improvement suggestion"
        }
    ]
}

"#,
    );
    prompt.push_str(JSON_ONLY_SUFFIX);
    prompt
}

pub fn create_books_prompt(request: &BookRequest) -> String {
    let mut prompt = format!(
        "Recommend textbooks and online resources for this course:

Subject: {}
Audience: {}
",
        request.subject, request.audience
    );

    prompt.push_str(
        r#"
Provide a JSON response with:
{
    "textbooks": [
        {
            "title": "Book Title",
            "author": "Author Name",
            "year": "2023",
            "isbn": "ISBN if available",
            "description": "Brief description",
            "suitability": "Why this book is suitable"
        }
    ],
    "online_resources": [
        {
            "title": "Resource Title",
            "url": "https://example.com",
            "description": "Brief description",
            "type": "Video|Article|Tutorial|Other"
        }
    ]
}

"#,
    );
    prompt.push_str(JSON_ONLY_SUFFIX);
    prompt
}
