//! Multipart decoding for story submissions.
//!
//! The form carries text fields, repeated `categories` ids, one `thumbnail`
//! file, and up to ten `editor_images` files. Files are buffered in memory;
//! the normalizer bounds what actually gets decoded.

use actix_multipart::Multipart;
use cp_core::error::AppError;
use cp_core::service::StorySubmission;
use futures_util::TryStreamExt;
use uuid::Uuid;

const MAX_EDITOR_IMAGES: usize = 10;

pub async fn read_story_form(mut payload: Multipart) -> Result<StorySubmission, AppError> {
    let mut form = StorySubmission::default();
    let mut category_ids: Option<Vec<Uuid>> = None;

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            buf.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "title" => form.title = text(buf)?,
            "content" => form.content = text(buf)?,
            "borough" => form.borough = text(buf)?,
            "summary" => form.summary = text(buf)?,
            "authorId" => form.author_id = Some(text(buf)?),
            "categories" => {
                let id = Uuid::parse_str(text(buf)?.trim())
                    .map_err(|_| AppError::Validation("malformed category id".into()))?;
                category_ids.get_or_insert_with(Vec::new).push(id);
            }
            "thumbnail" => form.thumbnail = Some(buf),
            "editor_images" => {
                if form.editor_images.len() >= MAX_EDITOR_IMAGES {
                    return Err(AppError::Validation(format!(
                        "at most {MAX_EDITOR_IMAGES} editor images per story"
                    )));
                }
                form.editor_images.push(buf);
            }
            // Unknown fields are ignored, matching lenient form handling.
            _ => {}
        }
    }

    form.category_ids = category_ids;
    Ok(form)
}

fn malformed(e: actix_multipart::MultipartError) -> AppError {
    AppError::Validation(format!("malformed multipart payload: {e}"))
}

fn text(buf: Vec<u8>) -> Result<String, AppError> {
    String::from_utf8(buf).map_err(|_| AppError::Validation("field is not valid UTF-8".into()))
}
