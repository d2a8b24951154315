/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Leaderboard read side.
pub mod leaderboard_service;
/// Reconciliation worklists and manual grading.
pub mod review_service;
/// Submission admission, recording, and auto-grading orchestration.
pub mod submission_service;
