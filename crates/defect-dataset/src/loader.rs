//! Image listing and loading for flat image directories.

use std::path::{Path, PathBuf};

use defect_core::{Error, ImageSize, Result, DEFAULT_EXTENSIONS};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Lists and decodes images with a fixed set of recognized extensions
#[derive(Debug, Clone)]
pub struct ImageLoader {
    /// Lowercased suffixes including the dot (".jpg")
    suffixes: Vec<String>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl ImageLoader {
    /// Creates a loader recognizing the given extensions (with or without dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = extensions
            .into_iter()
            .map(|ext| format!(".{}", ext.as_ref().trim_start_matches('.').to_lowercase()))
            .collect();

        Self { suffixes }
    }

    /// Checks whether a file name carries a recognized extension
    pub fn is_image_name(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.suffixes.iter().any(|suffix| lower.ends_with(suffix.as_str()))
    }

    /// Scans a directory (non-recursively) for image files.
    ///
    /// A missing directory yields an empty list; any other read failure is an
    /// error. Entries are matched by name only and returned sorted by path.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            debug!("Directory {} does not exist, no images listed", dir.display());
            return Ok(Vec::new());
        }

        if !dir.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let mut images = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if self.is_image_name(&entry.file_name().to_string_lossy()) {
                images.push(entry.into_path());
            }
        }

        images.sort();
        Ok(images)
    }

    /// Decodes an image from a path
    pub fn load_image(&self, path: &Path) -> Result<DynamicImage> {
        if !path.is_file() {
            return Err(Error::NotFound(format!(
                "Image file not found: {}",
                path.display()
            )));
        }

        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;

        Ok(image)
    }

    /// Decodes each path, optionally resizing; failures are logged and skipped
    pub fn load_images(&self, paths: &[PathBuf], resize: Option<ImageSize>) -> Vec<DynamicImage> {
        let mut images = Vec::with_capacity(paths.len());

        for path in paths {
            match self.load_image(path) {
                Ok(image) => {
                    let image = match resize {
                        Some(size) => resize_exact(&image, size),
                        None => image,
                    };
                    images.push(image);
                }
                Err(Error::NotFound(_)) => {
                    warn!("Warning: could not load {}", path.display());
                }
                Err(e) => {
                    warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        images
    }
}

/// Resizes an image to exactly the given dimensions, ignoring aspect ratio
pub fn resize_exact(image: &DynamicImage, size: ImageSize) -> DynamicImage {
    if image.width() == size.width && image.height() == size.height {
        return image.clone();
    }
    image.resize_exact(size.width, size.height, FilterType::Triangle)
}

/// File name of a path as a lossy string
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_image(path: &Path, width: u32, height: u32) {
        let img = image::ImageBuffer::from_fn(width, height, |_, _| image::Rgb([255u8, 0u8, 0u8]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_is_image_name() {
        let loader = ImageLoader::default();
        assert!(loader.is_image_name("photo.JPG"));
        assert!(loader.is_image_name("scan.tif"));
        assert!(loader.is_image_name("scan.TIFF"));
        assert!(!loader.is_image_name("notes.txt"));
        assert!(!loader.is_image_name("animation.gif"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ImageLoader::default();
        let images = loader.scan_directory(&temp_dir.path().join("missing")).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_scan_directory_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ImageLoader::default();

        fs::write(temp_dir.path().join("b.png"), b"x").unwrap();
        fs::write(temp_dir.path().join("a.JPEG"), b"x").unwrap();
        fs::write(temp_dir.path().join("c.bmp"), b"x").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();

        let images = loader.scan_directory(temp_dir.path()).unwrap();
        let names: Vec<_> = images.iter().map(|p| file_name_of(p)).collect();
        assert_eq!(names, vec!["a.JPEG", "b.png", "c.bmp"]);
    }

    #[test]
    fn test_scan_directory_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ImageLoader::default();

        let sub_dir = temp_dir.path().join("nested");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(sub_dir.join("deep.jpg"), b"x").unwrap();
        fs::write(temp_dir.path().join("top.jpg"), b"x").unwrap();

        let images = loader.scan_directory(temp_dir.path()).unwrap();
        assert_eq!(images, vec![temp_dir.path().join("top.jpg")]);
    }

    #[test]
    fn test_scan_file_is_invalid_argument() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();

        let result = ImageLoader::default().scan_directory(&file);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_directory_is_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.jpg"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // privileged users can still read the directory
        let readable = fs::read_dir(&locked).is_ok();
        let result = ImageLoader::default().scan_directory(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if readable {
            assert_eq!(result.unwrap().len(), 1);
        } else {
            assert!(matches!(result, Err(Error::Io(_))));
        }
    }

    #[test]
    fn test_load_image_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = ImageLoader::default().load_image(&temp_dir.path().join("nope.jpg"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_images_skips_failures_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ImageLoader::default();

        let first = temp_dir.path().join("first.png");
        let broken = temp_dir.path().join("broken.png");
        let last = temp_dir.path().join("last.png");
        create_test_image(&first, 8, 4);
        fs::write(&broken, b"not an image").unwrap();
        create_test_image(&last, 6, 6);

        let paths = vec![
            first,
            broken,
            temp_dir.path().join("missing.png"),
            last,
        ];

        let images = loader.load_images(&paths, None);
        assert_eq!(images.len(), 2);
        assert_eq!((images[0].width(), images[0].height()), (8, 4));
        assert_eq!((images[1].width(), images[1].height()), (6, 6));
    }

    #[test]
    fn test_load_images_resizes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("img.png");
        create_test_image(&path, 10, 20);

        let images = ImageLoader::default().load_images(&[path], Some(ImageSize::new(32, 16)));
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].width(), 32);
        assert_eq!(images[0].height(), 16);
    }
}
