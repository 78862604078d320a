use std::collections::HashMap;

use actix_multipart::{Multipart, MultipartError};
use futures_util::TryStreamExt;

/// One uploaded file from a mixed text/file form.
pub struct UploadedFile {
    pub field_name: String,
    pub original_filename: String,
    pub bytes: Vec<u8>,
}

/// A multipart form split into its text fields and its file fields.
/// Content editing posts text inputs keyed by placeholder name next to
/// file inputs keyed `<placeholder>_file`, so both maps are needed.
#[derive(Default)]
pub struct MixedForm {
    pub texts: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl MixedForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn file(&self, field_name: &str) -> Option<&UploadedFile> {
        self.files
            .iter()
            .find(|f| f.field_name == field_name && !f.original_filename.is_empty())
    }
}

pub async fn read_mixed_form(mut payload: Multipart) -> Result<MixedForm, MultipartError> {
    let mut form = MixedForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(original_filename) => form.files.push(UploadedFile {
                field_name,
                original_filename,
                bytes,
            }),
            None => {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                form.texts.insert(field_name, value);
            }
        }
    }

    Ok(form)
}
