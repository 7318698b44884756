use std::path::Path;
use std::sync::Arc;

/// Font database shared by every text draw of a renderer.
///
/// Loads system fonts plus any `.ttf`/`.otf`/`.ttc` files from extra directories. Family lookup
/// falls back to sans-serif, serif, monospace and finally the first loaded face, so text always
/// renders when at least one font is installed.
#[derive(Clone)]
pub struct FontBook {
    db: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl FontBook {
    /// System fonts only.
    pub fn system() -> Self {
        Self::with_font_dirs(std::iter::empty::<&Path>())
    }

    /// System fonts plus fonts found directly inside each of `dirs`.
    pub fn with_font_dirs<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self { db: Arc::new(db) }
    }

    /// An empty database, for tests that must not depend on installed fonts.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Number of loaded font faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Return `true` when a face with exactly this family name is loaded.
    pub fn has_family(&self, family: &str) -> bool {
        let families = [usvg::fontdb::Family::Name(family)];
        let query = usvg::fontdb::Query {
            families: &families,
            ..Default::default()
        };
        self.db
            .query(&query)
            .and_then(|id| self.db.face(id))
            .is_some_and(|face| {
                face.families
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(family))
            })
    }

    /// Parse options for text layers using this database.
    pub(crate) fn usvg_options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: Arc::clone(&self.db),
            font_resolver: make_font_resolver(),
            ..Default::default()
        }
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable font file");
        }
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }

            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}
