/// Annotation capture
///
/// A capture writes three files under the data directory:
/// - `copied_images/<stem>_NNN.<ext>`, a copy of the selected tile's image
/// - `annotations/<stem>_NNN.json`, the marked box and its classification
/// - `<prefix>_<label>[_<quality>]_NNN.png`, the rendered minimap view
///
/// NNN is the smallest free three-digit suffix, so nothing is overwritten.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CaptureError;

/// Suffixes 000 through 999
pub const MAX_SUFFIX_ATTEMPTS: usize = 1000;

/// A box drawn on a tile image plus its labels
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub top_left: (f64, f64),
    pub bot_right: (f64, f64),
    /// Classification label (flake type)
    pub label: String,
    pub quality: String,
}

/// Everything needed to capture the current selection
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Full-resolution image of the selected tile
    pub image_path: PathBuf,
    /// Name prefix for the saved view, usually the scan name
    pub prefix: String,
    pub view: RgbaImage,
    pub annotation: Annotation,
}

/// On-disk JSON sidecar
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub timestamp: String,
    pub original_img_path: String,
    pub copied_img_path: String,
    pub top_left: [f64; 2],
    pub bot_right: [f64; 2],
    pub flake_type: String,
    pub flake_quality: String,
}

/// Where a capture ended up
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReceipt {
    pub copied_image: PathBuf,
    pub record: PathBuf,
    pub view: PathBuf,
}

/// Parse the `x1, y1, x2, y2` box fields of the capture form.
///
/// Blank fields fall back to the matching corner of a `width` x `height`
/// image, so an empty form marks the whole tile.
pub fn parse_box(
    fields: &[String; 4],
    width: f64,
    height: f64,
) -> Result<((f64, f64), (f64, f64)), CaptureError> {
    let defaults = [0.0, 0.0, width, height];
    let mut values = [0.0; 4];
    for (value, (field, default)) in values.iter_mut().zip(fields.iter().zip(defaults)) {
        let field = field.trim();
        *value = if field.is_empty() {
            default
        } else {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CaptureError::InvalidBox(field.to_string()))?
        };
    }
    let [x1, y1, x2, y2] = values;
    Ok(((x1, y1), (x2, y2)))
}

/// First `<stem>_NNN<ext>` next to `path` that does not exist yet
pub fn add_incremented_suffix(path: &Path) -> Result<PathBuf, CaptureError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    (0..MAX_SUFFIX_ATTEMPTS)
        .map(|i| parent.join(format!("{stem}_{i:03}{extension}")))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| CaptureError::ResourceExhausted {
            path: path.to_path_buf(),
            attempts: MAX_SUFFIX_ATTEMPTS,
        })
}

/// File name of a saved view, before the numeric suffix
fn view_file_name(prefix: &str, annotation: &Annotation) -> String {
    let quality: String = annotation.quality.chars().filter(|c| *c != ' ').collect();
    if quality.is_empty() {
        format!("{prefix}_{}.png", annotation.label)
    } else {
        format!("{prefix}_{}_{quality}.png", annotation.label)
    }
}

#[derive(Debug, Clone)]
pub struct CaptureStore {
    root: PathBuf,
}

impl CaptureStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn copied_images_dir(&self) -> PathBuf {
        self.root.join("copied_images")
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.root.join("annotations")
    }

    /// Save the annotation and the rendered view
    pub fn capture(&self, request: &CaptureRequest) -> Result<CaptureReceipt, CaptureError> {
        let (copied_image, record) = self.save_annotation(&request.image_path, &request.annotation)?;
        let view = self.save_view(&request.prefix, &request.annotation, &request.view)?;

        tracing::info!(
            image = %copied_image.display(),
            record = %record.display(),
            view = %view.display(),
            "captured annotation"
        );

        Ok(CaptureReceipt {
            copied_image,
            record,
            view,
        })
    }

    /// Copy `image_path` into the store and write its annotation record.
    /// Returns the copy's path and the record's path.
    pub fn save_annotation(
        &self,
        image_path: &Path,
        annotation: &Annotation,
    ) -> Result<(PathBuf, PathBuf), CaptureError> {
        let copied_dir = self.copied_images_dir();
        let annotations_dir = self.annotations_dir();
        for dir in [&copied_dir, &annotations_dir] {
            create_dir(dir)?;
        }

        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());

        let copied_image = add_incremented_suffix(&copied_dir.join(&file_name))?;
        fs::copy(image_path, &copied_image).map_err(|source| CaptureError::Io {
            path: image_path.to_path_buf(),
            source,
        })?;

        let record = AnnotationRecord {
            timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            original_img_path: image_path.to_string_lossy().into_owned(),
            copied_img_path: copied_image.to_string_lossy().into_owned(),
            top_left: [annotation.top_left.0, annotation.top_left.1],
            bot_right: [annotation.bot_right.0, annotation.bot_right.1],
            flake_type: annotation.label.clone(),
            flake_quality: annotation.quality.clone(),
        };

        let record_path = add_incremented_suffix(&annotations_dir.join(format!("{stem}.json")))?;
        let json = serde_json::to_string(&record)?;
        fs::write(&record_path, json).map_err(|source| CaptureError::Io {
            path: record_path.clone(),
            source,
        })?;

        Ok((copied_image, record_path))
    }

    /// Write the rendered view as `<prefix>_<label>[_<quality>]_NNN.png`.
    /// Spaces are dropped from the quality.
    pub fn save_view(
        &self,
        prefix: &str,
        annotation: &Annotation,
        view: &RgbaImage,
    ) -> Result<PathBuf, CaptureError> {
        create_dir(&self.root)?;
        let path = add_incremented_suffix(&self.root.join(view_file_name(prefix, annotation)))?;
        view.save(&path).map_err(|source| CaptureError::Image {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn create_dir(dir: &Path) -> Result<(), CaptureError> {
    fs::create_dir_all(dir).map_err(|source| CaptureError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Run a capture on the blocking pool so file copies don't stall the UI
pub async fn save_in_background(
    store: CaptureStore,
    request: CaptureRequest,
) -> Result<CaptureReceipt, String> {
    tokio::task::spawn_blocking(move || store.capture(&request))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
        .map_err(|e| e.to_string())
}
