use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use usvg::fontdb;

use crate::{
    foundation::error::{LyricError, LyricResult},
    lyrics::transcript::extension_lower,
};

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Font bytes ready for layout and glyph rasterization.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// First family name of the face.
    pub family: String,
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// `true` when the requested family was unavailable.
    pub fallback: bool,
}

/// Maps a logical font name to a renderable font.
///
/// Implementations fall back to a default face rather than failing when the
/// requested family is missing; an error means no font is usable at all.
pub trait FontResolver: Send + Sync {
    /// Resolve `requested`, a family name or a font file path.
    fn resolve(&self, requested: &str) -> LyricResult<ResolvedFont>;
}

/// Resolver backed by the platform font database.
pub struct SystemFontResolver {
    db: Arc<fontdb::Database>,
    cache: Mutex<HashMap<String, ResolvedFont>>,
}

impl SystemFontResolver {
    /// System fonts plus any font files directly inside `extra_dir`.
    pub fn new(extra_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self::from_database(db)
    }

    /// Resolver over an already populated database.
    pub fn from_database(db: fontdb::Database) -> Self {
        Self {
            db: Arc::new(db),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of faces in the database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn load(&self, id: fontdb::ID, fallback: bool) -> Option<ResolvedFont> {
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        self.db
            .with_face_data(id, |data, index| ResolvedFont {
                family,
                data: Arc::new(data.to_vec()),
                index,
                fallback,
            })
    }

    fn query(&self, family: fontdb::Family<'_>) -> Option<fontdb::ID> {
        self.db.query(&fontdb::Query {
            families: &[family],
            ..fontdb::Query::default()
        })
    }

    fn resolve_uncached(&self, requested: &str) -> LyricResult<ResolvedFont> {
        let as_path = Path::new(requested);
        if as_path.is_file()
            && extension_lower(as_path).is_some_and(|e| FONT_EXTENSIONS.contains(&e.as_str()))
        {
            match std::fs::read(as_path) {
                Ok(bytes) => {
                    return Ok(ResolvedFont {
                        family: as_path
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .unwrap_or(requested)
                            .to_string(),
                        data: Arc::new(bytes),
                        index: 0,
                        fallback: false,
                    });
                }
                Err(e) => {
                    tracing::warn!(font = requested, error = %e, "font file unreadable, falling back");
                }
            }
        }

        if let Some(font) = self
            .query(fontdb::Family::Name(requested))
            .and_then(|id| self.load(id, false))
        {
            return Ok(font);
        }

        tracing::warn!(font = requested, "font not found, falling back to default sans-serif");
        let fallback_id = self
            .query(fontdb::Family::SansSerif)
            .or_else(|| self.db.faces().next().map(|f| f.id));
        fallback_id
            .and_then(|id| self.load(id, true))
            .ok_or_else(|| {
                LyricError::asset(format!(
                    "no usable font for '{requested}': font database is empty"
                ))
            })
    }
}

impl FontResolver for SystemFontResolver {
    fn resolve(&self, requested: &str) -> LyricResult<ResolvedFont> {
        if let Ok(cache) = self.cache.lock()
            && let Some(hit) = cache.get(requested)
        {
            return Ok(hit.clone());
        }
        let font = self.resolve_uncached(requested)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(requested.to_string(), font.clone());
        }
        Ok(font)
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font folder unreadable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !extension_lower(&path).is_some_and(|e| FONT_EXTENSIONS.contains(&e.as_str())) {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
