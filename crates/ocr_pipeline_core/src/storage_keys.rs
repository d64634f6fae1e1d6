use chrono::{DateTime, Utc};

/// Key the static frontend writes uploads under: `<unix-millis>-<file name>`.
pub fn upload_object_key(uploaded_at: DateTime<Utc>, file_name: &str) -> String {
    format!("{}-{file_name}", uploaded_at.timestamp_millis())
}

/// Virtual-hosted style URL the frontend PUTs uploads against.
pub fn uploads_bucket_url(bucket: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/")
}
