//! Reading browser form submissions into [`FormFields`]

use axum::extract::Multipart;

use super::middleware::WebError;
use crate::models::{FormFields, UploadedFile};

/// Collect the text fields and files of a multipart form
pub async fn read_multipart(mut multipart: Multipart) -> Result<FormFields, WebError> {
    let mut fields = FormFields::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(format!("Formulaire illisible : {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }

        match field.file_name().map(|s| s.to_string()) {
            Some(filename) => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::BadRequest(format!("Fichier illisible : {}", e)))?;
                fields.insert_file(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| WebError::BadRequest(format!("Champ illisible : {}", e)))?;
                fields.insert(name, value);
            }
        }
    }

    Ok(fields)
}

