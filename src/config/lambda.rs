use crate::core::persister::{KeyScheme, DEFAULT_KEY_ATTRIBUTE};
use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub input_bucket: String,
    pub input_key: String,
    pub table: String,
    pub region: String,
    pub window: usize,
    pub key_scheme: KeyScheme,
    pub key_attribute: String,
}

impl LambdaConfig {
    /// Reads settings from the function environment. `INPUT_BUCKET` may be
    /// left unset when every event names its own bucket.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            input_bucket: env::var("INPUT_BUCKET").unwrap_or_default(),
            input_key: env::var("INPUT_KEY").unwrap_or_else(|_| "test_data.csv".to_string()),
            table: env::var("TABLE_NAME").unwrap_or_else(|_| "ETLDB".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            window: env::var("ETL_WINDOW")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(crate::core::orchestrator::DEFAULT_WINDOW),
            key_scheme: match env::var("ETL_KEY_SCHEME").as_deref() {
                Ok("sequenced") => KeyScheme::Sequenced,
                _ => KeyScheme::Content,
            },
            key_attribute: env::var("ETL_KEY_ATTRIBUTE")
                .unwrap_or_else(|_| DEFAULT_KEY_ATTRIBUTE.to_string()),
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        if self.input_bucket.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "INPUT_BUCKET".to_string(),
            });
        }
        validate_s3_bucket_name("INPUT_BUCKET", &self.input_bucket)?;
        validation::validate_path("INPUT_KEY", &self.input_key)?;
        validation::validate_file_extension("INPUT_KEY", &self.input_key, &["csv"])?;
        validation::validate_non_empty_string("TABLE_NAME", &self.table)?;
        validation::validate_non_empty_string("AWS_REGION", &self.region)?;
        validation::validate_positive_number("ETL_WINDOW", self.window, 1)?;

        tracing::info!("Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let reason = if bucket_name.len() < 3 || bucket_name.len() > 63 {
        Some("S3 bucket name must be between 3 and 63 characters")
    } else if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        Some("S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots")
    } else if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        Some("S3 bucket name cannot start or end with a hyphen")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Reads input objects from one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                EtlError::input_load(
                    format!("s3://{}/{}", self.bucket, path),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        let data = resp.body.collect().await.map_err(|e| {
            EtlError::input_load(format!("s3://{}/{}", self.bucket, path), e.to_string())
        })?;

        Ok(data.into_bytes().to_vec())
    }
}
