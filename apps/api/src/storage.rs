//! Compiled-artifact storage on S3 (MinIO locally).

use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, primitives::ByteStream};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Object key for a variant's compiled PDF.
pub fn variant_pdf_key(variant_id: Uuid) -> String {
    format!("resumes/{variant_id}/resume.pdf")
}

pub async fn upload_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    pdf: Bytes,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded s3://{bucket}/{key}");
    Ok(())
}

/// Time-limited GET URL for a stored artifact. Failures are logged and yield
/// `None` so a missing link never fails the surrounding read.
pub async fn signed_url(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    path: &str,
    ttl_secs: u64,
) -> Option<String> {
    let key = path.trim_start_matches('/');
    if key.is_empty() {
        return None;
    }

    let presigning = match PresigningConfig::expires_in(Duration::from_secs(ttl_secs)) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid presigning TTL {ttl_secs}s: {e}");
            return None;
        }
    };

    match s3.get_object().bucket(bucket).key(key).presigned(presigning).await {
        Ok(request) => Some(request.uri().to_string()),
        Err(e) => {
            warn!("Failed to sign URL for s3://{bucket}/{key}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    fn offline_client() -> aws_sdk_s3::Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "tests"))
            .endpoint_url("http://127.0.0.1:9000")
            .force_path_style(true)
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }

    #[test]
    fn test_variant_pdf_key() {
        let id = Uuid::nil();
        assert_eq!(
            variant_pdf_key(id),
            "resumes/00000000-0000-0000-0000-000000000000/resume.pdf"
        );
    }

    #[tokio::test]
    async fn test_signed_url_is_generated_offline() {
        let url = signed_url(&offline_client(), "resumes", "/resumes/abc/resume.pdf", 600)
            .await
            .unwrap();
        assert!(url.starts_with("http://127.0.0.1:9000/resumes/resumes/abc/resume.pdf?"));
        assert!(url.contains("X-Amz-Expires=600"));
    }

    #[tokio::test]
    async fn test_empty_path_has_no_url() {
        assert_eq!(signed_url(&offline_client(), "resumes", "", 600).await, None);
    }
}
