use reqwest::multipart::{Form, Part};

use crate::errors::AdminResult;
use crate::models::{NewPackage, PackageUpdate};
use crate::uploads::UploadFile;

/// Builds the multipart body for a partial update, with an optional image
/// part so the dialog's field edits and upload share one round trip.
pub fn update_form(update: &PackageUpdate, file: Option<&UploadFile>) -> AdminResult<Form> {
    let mut form = Form::new();
    for (name, value) in update.text_fields() {
        form = form.text(name, value);
    }
    if let Some(file) = file {
        form = form.part("image", image_part(file)?);
    }
    Ok(form)
}

/// Builds the multipart body for package creation.
pub fn create_form(draft: &NewPackage, file: Option<&UploadFile>) -> AdminResult<Form> {
    let mut form = Form::new();
    for (name, value) in draft.text_fields() {
        form = form.text(name, value);
    }
    if let Some(file) = file {
        form = form.part("image", image_part(file)?);
    }
    Ok(form)
}

fn image_part(file: &UploadFile) -> AdminResult<Part> {
    let part = Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(crate::errors::AdminError::Transport)?;
    Ok(part)
}
