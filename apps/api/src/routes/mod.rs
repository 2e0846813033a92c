pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{auth, cover_letter, jobs, outreach, resume};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handlers::handle_list_jobs).post(jobs::handlers::handle_create_job),
        )
        .route(
            "/api/v1/jobs/analyze-jd",
            post(jobs::handlers::handle_analyze_jd),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(jobs::handlers::handle_get_job)
                .patch(jobs::handlers::handle_update_job)
                .delete(jobs::handlers::handle_delete_job),
        )
        // Resume
        .route(
            "/api/v1/resume/master",
            get(resume::handlers::handle_get_master).post(resume::handlers::handle_upload_master),
        )
        .route(
            "/api/v1/resume/variant",
            post(resume::handlers::handle_update_variant),
        )
        .route(
            "/api/v1/resume/variant/:job_id",
            get(resume::handlers::handle_get_variant),
        )
        .route(
            "/api/v1/resume/variant/:job_id/tailor",
            post(resume::handlers::handle_tailor_variant),
        )
        // Cover letters
        .route(
            "/api/v1/cover-letter/generate",
            post(cover_letter::handlers::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/cover-letter/:job_id",
            get(cover_letter::handlers::handle_get_cover_letter)
                .patch(cover_letter::handlers::handle_update_cover_letter),
        )
        // Outreach
        .route(
            "/api/v1/outreach/contacts",
            get(outreach::handlers::handle_list_contacts)
                .post(outreach::handlers::handle_create_contact),
        )
        .route(
            "/api/v1/outreach/contacts/:contact_id",
            get(outreach::handlers::handle_get_contact)
                .patch(outreach::handlers::handle_update_contact),
        )
        .route(
            "/api/v1/outreach/generate-dm",
            post(outreach::handlers::handle_generate_dm),
        )
        .with_state(state)
}
