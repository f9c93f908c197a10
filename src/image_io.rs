use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::fs;
use image::{ImageFormat, RgbImage};

use crate::errors::{HeatmapError, Result};

/// Extensions picked up when scanning an input directory
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: RgbImage,
    pub path: PathBuf,
    /// Prefix of every output written for this image
    pub filename: String,
}

/// Get all supported raster files from a directory (recursively), sorted
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(HeatmapError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(HeatmapError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut files = Vec::new();
    find_image_files_recursive(dir_path, &mut files)?;
    files.sort();

    Ok(files)
}

fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() && has_image_extension(&path) {
            result.push(path);
        }
    }

    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Decode an encoded image held in memory, dropping any alpha channel
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Name used for the outputs of `path`: its location below `root` with the
/// directory separators flattened to `_`. The extension is kept, so
/// `leaf.png` and `leaf.jpg` never share an overlay.
pub fn output_name(path: &Path, root: &Path) -> Result<String> {
    let relative = match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => path.file_name().map(Path::new).unwrap_or(path),
    };

    let parts = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<&str>>>()
        .ok_or_else(|| HeatmapError::InvalidPath(path.to_path_buf()))?;

    if parts.is_empty() {
        return Err(HeatmapError::InvalidPath(path.to_path_buf()));
    }
    Ok(parts.join("_"))
}

/// Fail if two inputs below `root` would write to the same output names
pub fn check_unique_output_names<P: AsRef<Path>>(paths: &[P], root: &Path) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for path in paths {
        let path = path.as_ref();
        let name = output_name(path, root)?;
        if let Some(previous) = seen.insert(name.clone(), path) {
            return Err(HeatmapError::Config(format!(
                "{} and {} would both write outputs named '{}'",
                previous.display(),
                path.display(),
                name
            )));
        }
    }
    Ok(())
}

/// Load an image from disk as RGB, named after its file name
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();
    load_image_under(path, path)
}

/// Load an image found while scanning `root`, named by [`output_name`]
pub fn load_image_under<P: AsRef<Path>>(path: P, root: &Path) -> Result<InputImage> {
    let path = path.as_ref();
    let filename = output_name(path, root)?;

    let img = image::open(path)?;

    Ok(InputImage {
        image: img.to_rgb8(),
        path: path.to_path_buf(),
        filename,
    })
}

/// Save an RGB image as PNG
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
