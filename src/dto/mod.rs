/// Health check payloads.
pub mod health;
/// Leaderboard payloads.
pub mod leaderboard;
/// Grader worklist and grading payloads.
pub mod review;
/// Submission request/receipt payloads.
pub mod submission;
