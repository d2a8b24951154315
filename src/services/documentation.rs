use utoipa::OpenApi;

/// Aggregated OpenAPI specification for Bug Bash Back.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::submissions::submit_answer,
        crate::routes::submissions::submit_bug,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::leaderboard::refresh_leaderboard,
        crate::routes::review::pending_submissions,
        crate::routes::review::reviewed_submissions,
        crate::routes::review::apply_grade,
        crate::routes::review::mark_answer,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::submission::AnswerRequest,
            crate::dto::submission::BugRequest,
            crate::dto::submission::SubmissionReceipt,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::review::ReviewItem,
            crate::dto::review::GradeSummary,
            crate::dto::review::GradeRequest,
            crate::dto::review::MarkAnswerRequest,
            crate::dto::review::GradeResponse,
            crate::catalog::QuestionKind,
            crate::dao::models::SubmissionKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "submissions", description = "Answer and bug note submission"),
        (name = "leaderboard", description = "Public team ranking"),
        (name = "review", description = "Grader worklists and manual grading"),
    )
)]
pub struct ApiDoc;
