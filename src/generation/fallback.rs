//! Templated stand-ins used when no usable object can be recovered from a reply.
//!
//! Content is generic and derived only from the request; it keeps the response
//! shape intact so the client can still render something.

use crate::types::{
    BloomLevel, BookRecommendation, BookRequest, CourseDesign, CourseModule, CourseRequest, Lab,
    LearningOutcome, OnlineResource, OutcomeAssessment, OutcomeRequest,
    RecommendedTextbook, Reference, SyllabusAssessment, SyllabusSubmission, Textbook,
};

const MODULE_THEMES: [&str; 5] = [
    "Foundations",
    "Core Concepts",
    "Techniques and Methods",
    "Applications",
    "Advanced Topics and Synthesis",
];

/// More lecture hours than fit in a week are treated as a typo
const MAX_WEEKLY_HOURS: u32 = 40;

/// Lecture hours from an "L:T:P" string, defaulting to 3 per week
fn weekly_lecture_hours(ltp: &str) -> u32 {
    ltp.split(':')
        .next()
        .and_then(|l| l.trim().parse::<u32>().ok())
        .filter(|&l| l > 0)
        .map_or(3, |l| l.min(MAX_WEEKLY_HOURS))
}

pub fn course_design(request: &CourseRequest) -> CourseDesign {
    let title = request.title.trim();
    // 14-week semester split evenly across five modules
    let hours = weekly_lecture_hours(&request.ltp) * 14 / 5;

    let modules = MODULE_THEMES
        .iter()
        .map(|theme| CourseModule {
            title: format!("{theme} of {title}"),
            hours: hours.max(1),
            description: format!(
                "{theme} of {title} for {} learners.",
                request.audience
            ),
        })
        .collect();

    let outcomes = [
        (BloomLevel::Understand, "Explain the fundamental principles of"),
        (BloomLevel::Apply, "Apply standard techniques from"),
        (BloomLevel::Analyze, "Analyze problems using concepts from"),
        (BloomLevel::Create, "Design solutions that integrate"),
    ]
    .into_iter()
    .map(|(level, stem)| LearningOutcome {
        text: format!("{stem} {title}"),
        bloom_level: level.to_string(),
        description: format!("{level}-level outcome for {title}."),
    })
    .collect();

    let labs = (1..=5)
        .map(|n| Lab {
            title: format!("{title} Lab {n}"),
            module: n.to_string(),
            description: format!("Hands-on exercises for module {n}."),
            duration: "2 hours".to_string(),
        })
        .collect();

    let textbooks = (1..=3)
        .map(|n| Textbook {
            title: format!("{title}: Recommended Text {n}"),
            author: "To be selected by the instructor".to_string(),
            year: String::new(),
            isbn: String::new(),
        })
        .collect();

    let references = vec![Reference {
        title: format!("{title} open course materials"),
        url: String::new(),
        description: "Search open courseware repositories for current material.".to_string(),
    }];

    CourseDesign {
        modules,
        outcomes,
        labs,
        textbooks,
        references,
    }
}

pub fn outcome_assessment(request: &OutcomeRequest) -> OutcomeAssessment {
    let level = BloomLevel::classify(&request.outcome);
    OutcomeAssessment {
        current_bloom_level: level.to_string(),
        quality_score: 5,
        strengths: vec![format!("Uses {level}-level language")],
        weaknesses: vec!["Automatic analysis was unavailable for this outcome".to_string()],
        suggested_improvements: vec![
            "Start with a single measurable action verb".to_string(),
            "State the condition and the standard of performance".to_string(),
        ],
        improved_outcome: request.outcome.trim().to_string(),
    }
}

pub fn syllabus_assessment(submission: &SyllabusSubmission) -> SyllabusAssessment {
    let mut missing_elements = Vec::new();
    let lowered = submission.content.to_lowercase();
    for (needle, element) in [
        ("outcome", "Learning outcomes"),
        ("assessment", "Assessment scheme"),
        ("textbook", "Textbooks and references"),
        ("schedule", "Weekly schedule"),
    ] {
        if !lowered.contains(needle) {
            missing_elements.push(element.to_string());
        }
    }

    SyllabusAssessment {
        overall_score: 5,
        completeness_score: 5,
        bloom_alignment: 5,
        strengths: vec![format!("Syllabus '{}' was received", submission.filename)],
        weaknesses: vec!["Automatic analysis was unavailable for this syllabus".to_string()],
        missing_elements,
        recommendations: vec![
            "Write each outcome with a measurable Bloom's verb".to_string(),
            "Map every assessment to at least one outcome".to_string(),
        ],
        outcome_analysis: Vec::new(),
    }
}

pub fn book_recommendation(request: &BookRequest) -> BookRecommendation {
    let subject = request.subject.trim();
    BookRecommendation {
        textbooks: vec![RecommendedTextbook {
            title: format!("Introductory text on {subject}"),
            author: "To be selected by the instructor".to_string(),
            year: String::new(),
            isbn: String::new(),
            description: format!("A standard introduction to {subject}."),
            suitability: format!("Pitched at {} readers.", request.audience),
        }],
        online_resources: vec![OnlineResource {
            title: format!("{subject} lecture series"),
            url: String::new(),
            description: format!("Open lecture material covering {subject}."),
            kind: "Video".to_string(),
        }],
    }
}
