use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, multipart::Field},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use barter_types::image::{MAX_IMAGE_BYTES, is_image_mime};
use barter_types::models::ItemImage;

use crate::error::{ApiError, AppError};

pub const IMAGE_TOO_LARGE: &str =
    "Image file is too large (max 10MB). Please choose a smaller image.";
pub const IMAGE_NOT_ALLOWED: &str = "Only image uploads are allowed";

/// Request body up to which form routes accept uploads. The image itself is
/// held to `MAX_IMAGE_BYTES` while reading.
pub const FORM_BODY_LIMIT: usize = 16 * 1024 * 1024;

fn content_type(req: &Request) -> &str {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// A JSON body when the request says so, otherwise a url-encoded form.
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if content_type(&req).starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(FormOrJson(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(FormOrJson(value))
        }
    }
}

/// An HTML form post, multipart or url-encoded, with at most one image.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    fields: Vec<(String, String)>,
    pub upload: Option<ItemImage>,
    /// Set when a file was sent but could not be accepted.
    pub upload_error: Option<&'static str>,
}

impl SubmittedForm {
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        Self { fields, ..Self::default() }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or("").trim().to_string()
    }

    /// Every value posted under `name`, in order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Checkbox-style truthiness.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("on" | "true" | "1" | "yes")
        )
    }
}

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !content_type(&req).starts_with("multipart/form-data") {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request("Bad Request", e.body_text()))?;
            return Ok(SubmittedForm::from_fields(fields));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request("Bad Request", e.body_text()))?;

        let mut form = SubmittedForm::default();
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    warn!("Form body over limit: {}", e);
                    form.upload_error = Some(IMAGE_TOO_LARGE);
                    break;
                }
                Err(e) => {
                    warn!("Failed to read multipart field: {}", e);
                    return Err(AppError::bad_request("Bad Request", e.body_text()));
                }
            };

            let name = field.name().unwrap_or("").to_string();
            if field.file_name().is_some() {
                read_upload(field, &mut form).await?;
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request("Bad Request", e.body_text()))?;
                form.fields.push((name, value));
            }
        }

        Ok(form)
    }
}

async fn read_upload(mut field: Field<'_>, form: &mut SubmittedForm) -> Result<(), AppError> {
    let declared = field.content_type().unwrap_or("").to_string();
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::bad_request("Upload Failed", IMAGE_TOO_LARGE)
        } else {
            AppError::bad_request("Bad Request", e.body_text())
        }
    })? {
        if data.len() + chunk.len() > MAX_IMAGE_BYTES {
            form.upload_error = Some(IMAGE_TOO_LARGE);
            return Ok(());
        }
        data.extend_from_slice(&chunk);
    }

    // An empty file input still posts a part.
    if data.is_empty() {
        return Ok(());
    }

    if !declared.is_empty() && !is_image_mime(&declared) {
        debug!("Rejected upload with content type {}", declared);
        form.upload_error = Some(IMAGE_NOT_ALLOWED);
        return Ok(());
    }

    form.upload = Some(ItemImage { data, content_type: declared });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_helpers() {
        let form = SubmittedForm::from_fields(vec![
            ("title".into(), "  Lamp ".into()),
            ("wantedCategories".into(), "Books".into()),
            ("wantedCategories".into(), "Toys".into()),
            ("createNewItem".into(), "on".into()),
        ]);

        assert_eq!(form.text("title"), "Lamp");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.all("wantedCategories"), vec!["Books", "Toys"]);
        assert!(form.flag("createNewItem"));
        assert!(!form.flag("includeSwapped"));
    }
}
