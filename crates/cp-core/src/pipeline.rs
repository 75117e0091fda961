//! # Asset ingestion pipeline
//!
//! Turns "one thumbnail + N editor image files + content full of ephemeral
//! blob references" into "one thumbnail URL + content with durable URLs".
//! The pipeline only talks to its two ports; persisting the result is the
//! caller's job.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::Result;
use crate::traits::{AssetStore, ImageNormalizer};

/// Ephemeral client-local image locators embedded in submitted rich text.
/// A reference runs from the `blob:` scheme up to the next quote, whitespace,
/// or closing angle bracket.
static BLOB_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"blob:https?://[^"'\s>]+"#).expect("blob reference pattern"));

/// Result of a successful ingest. `thumbnail_url` is `None` when no (or an
/// empty) thumbnail file was submitted; the caller decides whether that is an
/// error (required on create) or "keep the existing one" (edit).
#[derive(Debug, Clone)]
pub struct IngestedAssets {
    pub content: String,
    pub thumbnail_url: Option<String>,
}

pub struct AssetPipeline {
    normalizer: Arc<dyn ImageNormalizer>,
    store: Arc<dyn AssetStore>,
}

impl AssetPipeline {
    pub fn new(normalizer: Arc<dyn ImageNormalizer>, store: Arc<dyn AssetStore>) -> Self {
        Self { normalizer, store }
    }

    /// Normalizes and uploads every submitted file, rewriting the i-th
    /// ephemeral reference in `content` to the i-th uploaded URL.
    ///
    /// Submission order is the only correlation key between files and
    /// references. The pairing plan is built before the first upload. Extra
    /// files are uploaded but never linked; extra references stay unresolved.
    /// That mismatch handling is inherited legacy behavior, kept on purpose.
    ///
    /// Any normalize/upload failure aborts the whole ingest; there is no
    /// partial-success contract. Objects already written before the failure
    /// stay in the store (orphaned, reclaimable out of band).
    pub async fn ingest(
        &self,
        title: &str,
        content: &str,
        thumbnail: Option<&[u8]>,
        editor_images: &[Vec<u8>],
    ) -> Result<IngestedAssets> {
        let thumbnail_url = match thumbnail {
            Some(bytes) if !bytes.is_empty() => {
                Some(self.upload_one(title, bytes, "thumbnail").await?)
            }
            _ => None,
        };

        let refs = collect_ephemeral_refs(content);
        let plan: Vec<(&[u8], Option<&String>)> = editor_images
            .iter()
            .enumerate()
            .map(|(i, file)| (file.as_slice(), refs.get(i)))
            .collect();

        let mut updated = content.to_string();
        for (file, target) in plan {
            let url = self.upload_one(title, file, "content").await?;
            if let Some(target) = target {
                // Every occurrence of the reference, not just the first.
                updated = updated.replace(target.as_str(), &url);
            }
        }

        Ok(IngestedAssets {
            content: updated,
            thumbnail_url,
        })
    }

    async fn upload_one(&self, title: &str, bytes: &[u8], role: &str) -> Result<String> {
        let image = self.normalizer.normalize(bytes).await?;
        let key = object_key(title, role, image.extension);
        self.store.put(&key, image.bytes, image.content_type).await
    }
}

/// Every ephemeral reference in document order. Duplicates are kept: the
/// positional pairing counts occurrences the same way the submitting editor
/// does.
fn collect_ephemeral_refs(content: &str) -> Vec<String> {
    BLOB_REF
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercases the title, maps every non-alphanumeric character to `_`, and
/// truncates to 50 characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .take(50)
        .collect()
}

/// `images/{sanitized-title}-{suffix}-{role}.{ext}`. The random suffix is
/// best-effort collision avoidance, not a uniqueness guarantee; keys also
/// vary by role and call sequence.
pub fn object_key(title: &str, role: &str, extension: &str) -> String {
    format!(
        "images/{}-{}-{}.{}",
        sanitize_title(title),
        short_suffix(),
        role,
        extension
    )
}

fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::traits::EncodedImage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Passes bytes through untouched; fails on the marker payload.
    struct FakeNormalizer;

    #[async_trait]
    impl ImageNormalizer for FakeNormalizer {
        async fn normalize(&self, raw: &[u8]) -> crate::error::Result<EncodedImage> {
            if raw == b"broken" {
                return Err(AppError::AssetDecode("bad bytes".into()));
            }
            Ok(EncodedImage {
                bytes: raw.to_vec(),
                content_type: "image/jpeg",
                extension: "jpg",
            })
        }
    }

    /// Records every put and answers with a URL derived from the payload, so
    /// tests can correlate uploads to rewrites without guessing random keys.
    #[derive(Default)]
    struct FakeStore {
        puts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AssetStore for FakeStore {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> crate::error::Result<String> {
            self.puts.lock().unwrap().push(key.to_string());
            Ok(format!(
                "https://cdn.test/{}",
                String::from_utf8_lossy(&bytes)
            ))
        }
    }

    fn pipeline(store: Arc<FakeStore>) -> AssetPipeline {
        AssetPipeline::new(Arc::new(FakeNormalizer), store)
    }

    #[tokio::test]
    async fn rewrites_references_in_submission_order() {
        let store = Arc::new(FakeStore::default());
        let content = r#"<p><img src="blob:http://local/aa"></p><img src="blob:http://local/bb">"#;

        let out = pipeline(store.clone())
            .ingest(
                "Title",
                content,
                None,
                &[b"first".to_vec(), b"second".to_vec()],
            )
            .await
            .unwrap();

        assert_eq!(
            out.content,
            r#"<p><img src="https://cdn.test/first"></p><img src="https://cdn.test/second">"#
        );
        assert!(out.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn replaces_every_occurrence_of_a_reference() {
        let store = Arc::new(FakeStore::default());
        let content = r#"<img src="blob:http://local/x"> and again blob:http://local/x"#;

        let out = pipeline(store)
            .ingest("t", content, None, &[b"img".to_vec()])
            .await
            .unwrap();

        assert!(!out.content.contains("blob:"));
        assert_eq!(out.content.matches("https://cdn.test/img").count(), 2);
    }

    #[tokio::test]
    async fn extra_files_upload_without_linking_and_extra_refs_stay() {
        let store = Arc::new(FakeStore::default());

        // More files than references: both upload, second is never linked.
        let out = pipeline(store.clone())
            .ingest(
                "t",
                r#"x blob:http://local/only y"#,
                None,
                &[b"a".to_vec(), b"b".to_vec()],
            )
            .await
            .unwrap();
        assert_eq!(store.puts.lock().unwrap().len(), 2);
        assert!(out.content.contains("https://cdn.test/a"));
        assert!(!out.content.contains("https://cdn.test/b"));

        // More references than files: the tail reference survives unresolved.
        let out = pipeline(Arc::new(FakeStore::default()))
            .ingest(
                "t",
                r#"blob:http://local/1 blob:http://local/2"#,
                None,
                &[b"a".to_vec()],
            )
            .await
            .unwrap();
        assert!(out.content.contains("blob:http://local/2"));
    }

    #[tokio::test]
    async fn thumbnail_roles_and_empty_thumbnail() {
        let store = Arc::new(FakeStore::default());
        let out = pipeline(store.clone())
            .ingest("My Story!", "", Some(b"thumb"), &[])
            .await
            .unwrap();
        assert_eq!(out.thumbnail_url.as_deref(), Some("https://cdn.test/thumb"));
        let keys = store.puts.lock().unwrap();
        assert!(keys[0].starts_with("images/my_story_-"));
        assert!(keys[0].ends_with("-thumbnail.jpg"));

        // A zero-length thumbnail means "absent".
        let out = pipeline(Arc::new(FakeStore::default()))
            .ingest("t", "", Some(b""), &[])
            .await
            .unwrap();
        assert!(out.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn one_bad_file_aborts_the_ingest() {
        let store = Arc::new(FakeStore::default());
        let err = pipeline(store.clone())
            .ingest(
                "t",
                "blob:http://local/1 blob:http://local/2",
                None,
                &[b"ok".to_vec(), b"broken".to_vec()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssetDecode(_)));
        // The first upload had already happened; that orphan is accepted.
        assert_eq!(store.puts.lock().unwrap().len(), 1);
    }

    #[test]
    fn sanitize_title_rules() {
        assert_eq!(sanitize_title("Brooklyn, At Night!"), "brooklyn__at_night_");
        let long = "x".repeat(80);
        assert_eq!(sanitize_title(&long).len(), 50);
    }
}
