use crate::{error::Error, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// A trait used to select which files of a directory are analyzed.
///
/// See [`gather_images`] for how filters are applied to a directory listing.
pub trait Filter {
    /// Return whether the file at `path`, named `file_name`, should be analyzed. Names that are not valid UTF-8 are
    /// passed with the invalid sequences replaced by `U+FFFD`.
    fn is_allowed(&self, path: &Path, file_name: &str) -> bool;
}

/// Accepts files whose name ends with one of a set of extensions.
///
/// Matching is a case-sensitive suffix match on the file name, so `png` accepts `a.png` but not `a.PNG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl Filter for ExtensionFilter {
    fn is_allowed(&self, _: &Path, file_name: &str) -> bool {
        self.extensions.iter().any(|extension| file_name.ends_with(extension.as_str()))
    }
}

/// List the regular files directly inside `directory` that `filter` allows, sorted by path.
///
/// Directory listing order differs between platforms, so the result is sorted to keep runs reproducible.
pub fn gather_images<F>(directory: &Path, filter: &F) -> Result<Vec<PathBuf>>
where
    F: Filter + ?Sized,
{
    let entries = std::fs::read_dir(directory).map_err(|e| Error::io(directory, e))?;
    let mut images = Vec::new();

    for entry in entries {
        let path = entry.map_err(|e| Error::io(directory, e))?.path();

        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().map(|name| name.to_string_lossy().into_owned()) else {
            continue;
        };

        if filter.is_allowed(&path, &file_name) {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_suffix_case_sensitively() {
        let filter = ExtensionFilter::default();

        assert!(filter.is_allowed(Path::new("a.jpg"), "a.jpg"));
        assert!(filter.is_allowed(Path::new("b.jpeg"), "b.jpeg"));
        assert!(filter.is_allowed(Path::new("c.bmp"), "c.bmp"));
        assert!(!filter.is_allowed(Path::new("d.PNG"), "d.PNG"));
        assert!(!filter.is_allowed(Path::new("notes.txt"), "notes.txt"));
    }

    #[test]
    fn custom_extensions_replace_defaults() {
        let filter = ExtensionFilter::new(["tiff"]);

        assert!(filter.is_allowed(Path::new("scan.tiff"), "scan.tiff"));
        assert!(!filter.is_allowed(Path::new("scan.png"), "scan.png"));
    }

    #[test]
    fn gathers_sorted_matching_files_only() {
        let directory = std::env::temp_dir().join(format!("color-labeler-filter-{}", std::process::id()));
        std::fs::create_dir_all(directory.join("nested.png")).unwrap();

        for name in ["b.png", "a.jpg", "c.txt", "D.JPG"] {
            std::fs::write(directory.join(name), b"").unwrap();
        }

        let images = gather_images(&directory, &ExtensionFilter::default()).unwrap();
        let names = images
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["a.jpg", "b.png"]);

        std::fs::remove_dir_all(&directory).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_left_to_the_filter() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let directory = std::env::temp_dir().join(format!("color-labeler-filter-lossy-{}", std::process::id()));
        std::fs::create_dir_all(&directory).unwrap();

        let image = directory.join(OsStr::from_bytes(b"caf\xe9.png"));
        if std::fs::write(&image, b"").is_err() {
            // the file system refuses names that are not valid UTF-8
            std::fs::remove_dir_all(&directory).unwrap();
            return;
        }
        std::fs::write(directory.join(OsStr::from_bytes(b"caf\xe9.txt")), b"").unwrap();

        let images = gather_images(&directory, &ExtensionFilter::default()).unwrap();
        assert_eq!(images, vec![image]);

        std::fs::remove_dir_all(&directory).unwrap();
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let result = gather_images(Path::new("no/such/directory"), &ExtensionFilter::default());
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
