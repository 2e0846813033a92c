//! In-process compilation consumer.
//!
//! Pops jobs from the compile queue, typesets the variant's LaTeX with the
//! configured external compiler, stores the PDF, and records the path on the
//! variant. Failed jobs are logged and dropped.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use serde_json::json;
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::actions::record_action;
use crate::errors::AppError;
use crate::models::resume::ResumeVariantRow;
use crate::models::vocab::ActionType;
use crate::render::queue::{CompileJob, COMPILE_QUEUE};
use crate::state::AppState;
use crate::storage::{upload_pdf, variant_pdf_key};

const POP_TIMEOUT_SECS: u64 = 5;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Runs forever. Spawn it on the runtime.
pub async fn run_compile_worker(state: AppState) {
    info!(
        compiler = %state.config.latex_compiler,
        "Compile worker listening on {COMPILE_QUEUE}"
    );

    loop {
        let mut conn = match state.redis.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Compile worker cannot reach Redis: {e}");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        loop {
            match next_job(&mut conn).await {
                Ok(Some(job)) => {
                    if let Err(e) = compile_variant(&state, &job).await {
                        error!(variant_id = %job.variant_id, "Resume compilation failed: {e}");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Compile queue read failed, reconnecting: {e}");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    break;
                }
            }
        }
    }
}

async fn next_job(conn: &mut MultiplexedConnection) -> anyhow::Result<Option<CompileJob>> {
    let popped: Option<(String, String)> = redis::cmd("BRPOP")
        .arg(COMPILE_QUEUE)
        .arg(POP_TIMEOUT_SECS)
        .query_async(conn)
        .await?;

    match popped {
        Some((_, payload)) => match serde_json::from_str::<CompileJob>(&payload) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                warn!("Dropping malformed compile job {payload:?}: {e}");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

async fn compile_variant(state: &AppState, job: &CompileJob) -> Result<(), AppError> {
    let Some(variant) =
        sqlx::query_as::<_, ResumeVariantRow>("SELECT * FROM resume_variant WHERE id = $1")
            .bind(job.variant_id)
            .fetch_optional(&state.db)
            .await?
    else {
        warn!(variant_id = %job.variant_id, "Variant no longer exists, skipping compilation");
        return Ok(());
    };

    info!(variant_id = %variant.id, "Compiling resume variant");
    let pdf = compile_latex(
        &state.config.latex_compiler,
        &variant.latex_blob,
        Duration::from_secs(state.config.compile_timeout_secs),
    )
    .await?;

    let key = variant_pdf_key(variant.id);
    upload_pdf(&state.s3, &state.config.s3_bucket, &key, pdf).await?;

    sqlx::query("UPDATE resume_variant SET pdf_path = $1, updated_at = now() WHERE id = $2")
        .bind(&key)
        .bind(variant.id)
        .execute(&state.db)
        .await?;

    record_action(
        &state.db,
        variant.user_id,
        Some(variant.job_id),
        ActionType::ResumeCompiled,
        json!({ "variant_id": variant.id, "pdf_path": key }),
    )
    .await;

    info!(variant_id = %variant.id, pdf_path = %key, "Resume compilation completed");
    Ok(())
}

/// Typesets `latex` in a scratch directory and returns the PDF bytes.
pub async fn compile_latex(compiler: &str, latex: &str, timeout: Duration) -> Result<Bytes, AppError> {
    let workdir = tempfile::tempdir().map_err(|e| AppError::Internal(e.into()))?;
    let tex_path = workdir.path().join("resume.tex");
    tokio::fs::write(&tex_path, latex)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    run_compiler(compiler, workdir.path(), &tex_path, timeout).await?;

    let pdf = tokio::fs::read(workdir.path().join("resume.pdf"))
        .await
        .map_err(|_| AppError::Upstream("compiler produced no resume.pdf".to_string()))?;
    Ok(Bytes::from(pdf))
}

async fn run_compiler(
    compiler: &str,
    outdir: &Path,
    tex_path: &Path,
    timeout: Duration,
) -> Result<(), AppError> {
    let child = Command::new(compiler)
        .arg("--outdir")
        .arg(outdir)
        .arg(tex_path)
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, child)
        .await
        .map_err(|_| AppError::Upstream(format!("{compiler} timed out after {}s", timeout.as_secs())))?
        .map_err(|e| AppError::Upstream(format!("failed to run {compiler}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: String = stderr
            .lines()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        return Err(AppError::Upstream(format!(
            "{compiler} exited with {}: {tail}",
            output.status
        )));
    }
    Ok(())
}
