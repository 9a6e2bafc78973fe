use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::errors::GenerationError;

/// Cached state of one bundled text asset.
#[derive(Debug, Clone)]
enum AssetEntry {
    Lines(Vec<String>),
    Missing,
}

/// Reads bundled line-oriented assets (name lists) once per process.
#[derive(Debug)]
pub struct AssetsLoader {
    root: PathBuf,
    cache: RwLock<BTreeMap<String, AssetEntry>>,
}

impl AssetsLoader {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Absolute path of an asset below the loader root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Non-empty trimmed lines of an asset; `None` when the file is absent.
    ///
    /// Lines starting with `#` are comments.
    pub fn load_lines(&self, relative: &str) -> Result<Option<Vec<String>>, GenerationError> {
        if let Some(entry) = self.cached(relative) {
            return Ok(match entry {
                AssetEntry::Lines(values) => Some(values),
                AssetEntry::Missing => None,
            });
        }

        let entry = Self::read_lines(&self.path(relative))?;
        let mut cache = self
            .cache
            .write()
            .map_err(|_| GenerationError::Asset("asset cache poisoned".to_string()))?;
        cache.insert(relative.to_string(), entry.clone());

        Ok(match entry {
            AssetEntry::Lines(values) => Some(values),
            AssetEntry::Missing => None,
        })
    }

    fn cached(&self, relative: &str) -> Option<AssetEntry> {
        let cache = self.cache.read().ok()?;
        cache.get(relative).cloned()
    }

    fn read_lines(path: &Path) -> Result<AssetEntry, GenerationError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AssetEntry::Missing);
            }
            Err(err) => {
                return Err(GenerationError::Asset(format!(
                    "failed to read asset {}: {}",
                    path.display(),
                    err
                )));
            }
        };

        let values = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        Ok(AssetEntry::Lines(values))
    }
}

/// Loader rooted at the crate's bundled `assets/` directory.
pub fn assets_loader() -> &'static AssetsLoader {
    static LOADER: OnceLock<AssetsLoader> = OnceLock::new();
    LOADER.get_or_init(|| {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        AssetsLoader::new(root)
    })
}
