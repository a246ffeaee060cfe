use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use courseweaver::build_router;
use courseweaver::database::Collection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use test_utils::{
    FailingProvider, StubProvider, build_docx, multipart_body, multipart_content_type, test_app,
};

const COURSE_JSON: &str = r#"{
    "modules": [
        {"title": "Asymptotic Analysis", "hours": 8, "description": "Big-O and recurrences"},
        {"title": "Sorting", "hours": 9, "description": "Comparison and linear-time sorts"},
        {"title": "Graphs", "hours": 9, "description": "Traversals and shortest paths"},
        {"title": "Dynamic Programming", "hours": 8, "description": "Optimal substructure"},
        {"title": "Intractability", "hours": 8, "description": "NP-completeness"}
    ],
    "outcomes": [
        {"text": "Analyze the running time of algorithms", "bloom_level": "Analyze", "description": "Use recurrences"}
    ],
    "labs": [
        {"title": "Benchmarking sorts", "module": "2", "description": "Compare sorts empirically", "duration": "2 hours"}
    ],
    "textbooks": [
        {"title": "Introduction to Algorithms", "author": "Cormen et al.", "year": "2022", "isbn": "9780262046305"}
    ],
    "references": [
        {"title": "MIT 6.006", "url": "https://ocw.mit.edu", "description": "Lecture videos"}
    ]
}"#;

fn fenced(json: &str) -> String {
    format!("Here is your course design:\n```json\n{json}\n```")
}

fn course_input() -> Value {
    json!({
        "title": "Intro to Algorithms",
        "credits": "4",
        "ltp": "3:1:0",
        "audience": "undergraduate"
    })
}

/// Every generated field is stored with the value that was returned
fn assert_stored_as_returned(document: &Value, body: &Value) {
    for (key, value) in body.as_object().expect("body is an object") {
        assert_eq!(&document[key], value, "stored '{key}' differs from response");
    }
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn post_upload(filename: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload-syllabus")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body("file", filename, bytes)))
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_generate_course_returns_and_stores_design() {
    let provider = Arc::new(StubProvider::new(fenced(COURSE_JSON)));
    let app = test_app(provider.clone());
    let input = course_input();

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json("/api/generate-course", &input),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let expected: Value = serde_json::from_str(COURSE_JSON).expect("reply is valid JSON");
    assert_eq!(body, expected);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Intro to Algorithms"));
    assert!(prompts[0].contains("3:1:0"));

    let stored = app.store.documents(Collection::Courses);
    assert_eq!(stored.len(), 1);
    let document = &stored[0];
    for (key, value) in input.as_object().expect("input is an object") {
        assert_eq!(&document[key], value, "stored document is missing input '{key}'");
    }
    assert_stored_as_returned(document, &body);
    assert!(document["created_at"].is_string());
}

#[tokio::test]
async fn test_off_schema_values_are_returned_as_sent() {
    let reply = json!({
        "modules": [
            {"title": "Sorting", "hours": "8-10", "description": "Comparison sorts"},
            {"title": "Graphs", "hours": 9, "description": "Traversals"}
        ],
        "outcomes": [],
        "labs": [{"title": "Benchmarking sorts", "module": 1, "description": "", "duration": "2 hours"}],
        "textbooks": [{"title": "Introduction to Algorithms", "author": "Cormen et al.", "year": 2022, "isbn": ""}],
        "references": [],
        "prerequisites": ["Discrete mathematics"]
    });
    let app = test_app(Arc::new(StubProvider::new(fenced(&reply.to_string()))));

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json("/api/generate-course", &course_input()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, reply);

    let stored = app.store.documents(Collection::Courses);
    assert_eq!(stored.len(), 1);
    assert_stored_as_returned(&stored[0], &reply);
    assert_eq!(stored[0]["title"], "Intro to Algorithms");
}

#[tokio::test]
async fn test_missing_sections_are_filled_in() {
    let reply = r#"{"modules": [{"title": "Sorting", "hours": 8, "description": "Merge sort"}]}"#;
    let app = test_app(Arc::new(StubProvider::new(reply)));

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json("/api/generate-course", &course_input()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "modules": [{"title": "Sorting", "hours": 8, "description": "Merge sort"}],
            "outcomes": [],
            "labs": [],
            "textbooks": [],
            "references": []
        })
    );
}

#[tokio::test]
async fn test_template_reply_survives_huge_lecture_load() {
    let app = test_app(Arc::new(StubProvider::new("no JSON here")));
    let input = json!({
        "title": "Compilers",
        "credits": "4",
        "ltp": "999999999:0:0",
        "audience": "graduate"
    });

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json("/api/generate-course", &input),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modules"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["modules"][0]["hours"], 112);
}

#[tokio::test]
async fn test_unparseable_reply_returns_template() {
    let app = test_app(Arc::new(StubProvider::new("Sorry, the model is overloaded.")));

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json("/api/check-outcome", &json!({"outcome": "Design a relational schema"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_bloom_level"], "Create");
    assert!(body["suggested_improvements"].is_array());

    let stored = app.store.documents(Collection::Outcomes);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["input"], "Design a relational schema");
}

#[tokio::test]
async fn test_model_failure_is_error_tagged_and_not_stored() {
    let app = test_app(Arc::new(FailingProvider("upstream returned 503")));

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json(
            "/api/get-books",
            &json!({"subject": "Operating Systems", "audience": "graduate"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to recommend textbooks");
    assert!(
        body["details"]
            .as_str()
            .is_some_and(|d| d.contains("upstream returned 503"))
    );
    assert!(app.store.documents(Collection::Books).is_empty());
}

#[tokio::test]
async fn test_missing_field_is_rejected_before_generation() {
    let provider = Arc::new(StubProvider::new("{}"));
    let app = test_app(provider.clone());

    let (status, body) = send(
        build_router(app.state.clone()),
        post_json("/api/generate-course", &json!({"title": "Compilers"})),
    )
    .await;

    assert!(status.is_client_error(), "unexpected status {status}");
    assert_eq!(body["error"], "Invalid request");
    assert!(body["details"].is_string());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = test_app(Arc::new(StubProvider::new("{}")));
    let request = Request::builder()
        .method("POST")
        .uri("/api/check-outcome")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"outcome\": "))
        .expect("Failed to build request");

    let (status, _) = send(build_router(app.state.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_upload_is_rejected_without_writing() {
    let provider = Arc::new(StubProvider::new("{}"));
    let app = test_app(provider.clone());

    let (status, body) = send(
        build_router(app.state.clone()),
        post_upload("syllabus.txt", b"Week 1: Introduction"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Only .docx and .pdf files are supported.");
    assert!(!app.state.upload_dir.exists());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn test_docx_upload_is_saved_extracted_and_analyzed() {
    let reply = r#"{"overall_score": 7, "completeness_score": "6", "bloom_alignment": 8,
        "strengths": ["Clear schedule"], "weaknesses": [], "missing_elements": ["Grading policy"],
        "recommendations": ["Add rubrics"], "outcome_analysis": []}"#;
    let provider = Arc::new(StubProvider::new(reply));
    let app = test_app(provider.clone());
    let docx = build_docx(&[
        "CS101 Programming Fundamentals",
        "Outcome: Write simple programs",
        "Assessment: two exams",
    ]);

    let (status, body) = send(
        build_router(app.state.clone()),
        post_upload("cs101.docx", &docx),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let expected: Value = serde_json::from_str(reply).expect("reply is valid JSON");
    assert_eq!(body, expected);
    assert_eq!(body["completeness_score"], "6");

    let saved = std::fs::read(app.state.upload_dir.join("cs101.docx")).expect("upload saved");
    assert_eq!(saved, docx);

    let prompts = provider.prompts();
    assert!(prompts[0].contains(
        "CS101 Programming Fundamentals\nOutcome: Write simple programs\nAssessment: two exams"
    ));

    let stored = app.store.documents(Collection::Syllabi);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["filename"], "cs101.docx");
    assert_stored_as_returned(&stored[0], &body);
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = test_app(Arc::new(StubProvider::new("{}")));
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload-syllabus")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body("attachment", "cs101.pdf", b"%PDF")))
        .expect("Failed to build request");

    let (status, body) = send(build_router(app.state.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request");
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app(Arc::new(StubProvider::new("{}")));

    let get = |uri: &str| {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request")
    };

    let (status, body) = send(build_router(app.state.clone()), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "CourseWeaver API is running!"}));

    let (status, body) = send(build_router(app.state.clone()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "CourseWeaver API"})
    );
}

#[tokio::test]
async fn test_uploaded_files_are_served() {
    let app = test_app(Arc::new(StubProvider::new("{}")));
    std::fs::create_dir_all(&app.state.upload_dir).expect("create upload dir");
    std::fs::write(app.state.upload_dir.join("notes.pdf"), b"%PDF-1.4 stub").expect("write file");

    let response = build_router(app.state.clone())
        .oneshot(
            Request::builder()
                .uri("/uploads/notes.pdf")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    assert_eq!(&bytes[..], b"%PDF-1.4 stub");
}
