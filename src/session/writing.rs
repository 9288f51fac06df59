use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Task 1 needs at least 150 words, task 2 at least 250.
pub const TASK1_MIN_WORDS: usize = 150;
pub const TASK2_MIN_WORDS: usize = 250;

/// Largest photo accepted for a handwritten answer.
const MAX_IMAGE_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub data_url: String,
}

/// Typed answer plus photos of handwritten pages, autosaved while editing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub images: Vec<ImageUpload>,
}

impl WritingDraft {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    pub fn attach_image(&mut self, path: &Path) -> Result<&ImageUpload> {
        let upload = image_upload(path)?;
        self.images.push(upload);
        Ok(&self.images[self.images.len() - 1])
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn image_upload(path: &Path) -> Result<ImageUpload> {
    let Some(mime) = image_mime(path) else {
        bail!("{} is not a supported image (png, jpg, gif, webp)", path.display());
    };
    let meta = fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if meta.len() > MAX_IMAGE_BYTES {
        bail!(
            "{} is too large ({} bytes, limit {MAX_IMAGE_BYTES})",
            path.display(),
            meta.len()
        );
    }
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(ImageUpload {
        file_name,
        data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
    })
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
