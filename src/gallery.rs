//! Example person and garment images shipped alongside the demo.
//!
//! Layout of an assets directory:
//!
//! ```text
//! assets/
//!   human/      person photos
//!   cloth/      garment photos
//!   examples/   model{n}.png, garment{n}.png, result{n}.png showcase triples
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Result, TryonError};

/// Number of examples shown per picker page.
pub const EXAMPLES_PER_PAGE: usize = 12;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// A person, garment and the expected try-on result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showcase {
    pub person: PathBuf,
    pub garment: PathBuf,
    pub result: PathBuf,
}

/// Example images discovered under an assets directory.
#[derive(Debug, Clone, Default)]
pub struct ExampleGallery {
    pub humans: Vec<PathBuf>,
    pub garments: Vec<PathBuf>,
    pub showcase: Vec<Showcase>,
}

impl ExampleGallery {
    /// Scan `assets/human`, `assets/cloth` and `assets/examples`.
    ///
    /// The `human` and `cloth` directories are required; `examples` is
    /// optional.
    pub fn load(assets: &Path) -> Result<Self> {
        let humans = list_images(&assets.join("human"))?;
        let garments = list_images(&assets.join("cloth"))?;
        let examples = assets.join("examples");
        let showcase = if examples.is_dir() {
            find_showcase(&examples)?
        } else {
            Vec::new()
        };
        Ok(Self {
            humans,
            garments,
            showcase,
        })
    }

    /// Person images on the given zero-based page.
    pub fn human_page(&self, page: usize) -> &[PathBuf] {
        paginate(&self.humans, page)
    }

    /// Garment images on the given zero-based page.
    pub fn garment_page(&self, page: usize) -> &[PathBuf] {
        paginate(&self.garments, page)
    }

    pub fn page_count(&self) -> usize {
        self.humans
            .len()
            .max(self.garments.len())
            .div_ceil(EXAMPLES_PER_PAGE)
    }
}

fn paginate(items: &[PathBuf], page: usize) -> &[PathBuf] {
    let start = page.saturating_mul(EXAMPLES_PER_PAGE).min(items.len());
    let end = (start + EXAMPLES_PER_PAGE).min(items.len());
    &items[start..end]
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| TryonError::Io {
        context: format!("Failed to list {}", dir.display()),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TryonError::Io {
            context: format!("Failed to read entry in {}", dir.display()),
            source: e,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_file() && is_image(p))
        .collect())
}

fn find_showcase(dir: &Path) -> Result<Vec<Showcase>> {
    let mut indexed: Vec<(u32, Showcase)> = read_dir_sorted(dir)?
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let index: u32 = name.strip_prefix("model")?.strip_suffix(".png")?.parse().ok()?;
            let garment = dir.join(format!("garment{}.png", index));
            let result = dir.join(format!("result{}.png", index));
            (garment.is_file() && result.is_file()).then(|| {
                (
                    index,
                    Showcase {
                        person: path.clone(),
                        garment,
                        result,
                    },
                )
            })
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, s)| s).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_load_lists_sorted_images() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("human")).unwrap();
        fs::create_dir_all(root.join("cloth")).unwrap();
        touch(&root.join("human/b.jpg"));
        touch(&root.join("human/a.PNG"));
        touch(&root.join("human/notes.txt"));
        touch(&root.join("cloth/shirt.jpeg"));
        fs::create_dir_all(root.join("cloth/nested.png")).unwrap();

        let gallery = ExampleGallery::load(root).unwrap();
        assert_eq!(
            gallery.humans,
            vec![root.join("human/a.PNG"), root.join("human/b.jpg")]
        );
        assert_eq!(gallery.garments, vec![root.join("cloth/shirt.jpeg")]);
        assert!(gallery.showcase.is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("human")).unwrap();
        let err = ExampleGallery::load(temp.path()).unwrap_err();
        match err {
            TryonError::Io { context, .. } => assert!(context.contains("cloth")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_showcase_requires_complete_triples() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("human")).unwrap();
        fs::create_dir_all(root.join("cloth")).unwrap();
        let ex = root.join("examples");
        fs::create_dir_all(&ex).unwrap();
        for name in [
            "model10.png",
            "garment10.png",
            "result10.png",
            "model2.png",
            "garment2.png",
            "result2.png",
            "model3.png",
            "garment3.png",
        ] {
            touch(&ex.join(name));
        }

        let gallery = ExampleGallery::load(root).unwrap();
        assert_eq!(gallery.showcase.len(), 2);
        assert_eq!(gallery.showcase[0].person, ex.join("model2.png"));
        assert_eq!(gallery.showcase[0].result, ex.join("result2.png"));
        assert_eq!(gallery.showcase[1].garment, ex.join("garment10.png"));
    }

    #[test]
    fn test_pagination() {
        let gallery = ExampleGallery {
            humans: (0..30).map(|i| PathBuf::from(format!("{i}.jpg"))).collect(),
            garments: (0..5).map(|i| PathBuf::from(format!("{i}.jpg"))).collect(),
            showcase: Vec::new(),
        };
        assert_eq!(gallery.page_count(), 3);
        assert_eq!(gallery.human_page(0).len(), 12);
        assert_eq!(gallery.human_page(2).len(), 6);
        assert_eq!(gallery.human_page(2)[0], PathBuf::from("24.jpg"));
        assert!(gallery.human_page(3).is_empty());
        assert_eq!(gallery.garment_page(0).len(), 5);
        assert!(gallery.garment_page(1).is_empty());
        assert!(gallery.garment_page(usize::MAX).is_empty());
    }
}
