use std::sync::OnceLock;

use ab_glyph::{FontArc, FontVec, PxScale};
use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight, ID};
use imageproc::drawing::text_size;
use tracing::{debug, warn};

/// Width per character, as a fraction of the font size, when no font file is available.
const FALLBACK_ADVANCE: f32 = 0.55;

fn font_db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "system fonts indexed");
        db
    })
}

/// Parses a CSS `font-family` list. Generic keywords map to fontdb's generic families and
/// sans-serif is always tried last.
fn css_families(family_list: &str) -> Vec<Family<'_>> {
    let mut families: Vec<Family<'_>> = family_list
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "sans-serif" | "system-ui" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::Name(name),
        })
        .collect();
    if !families.iter().any(|family| matches!(family, Family::SansSerif)) {
        families.push(Family::SansSerif);
    }
    families
}

fn load_face(db: &Database, id: ID) -> Option<FontArc> {
    let face = db.face(id)?;
    let bytes = match &face.source {
        Source::File(path) | Source::SharedFile(path, _) => std::fs::read(path).ok()?,
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
    };
    let font = FontVec::try_from_vec_and_index(bytes, face.index).ok()?;
    debug!(
        family = face.families.first().map(|(name, _)| name.as_str()).unwrap_or_default(),
        "label font loaded"
    );
    Some(FontArc::new(font))
}

/// Label font plus text metrics. Without any usable system font, metrics fall back to a fixed
/// per-character estimate and labels draw their boxes without text.
#[derive(Clone, Default)]
pub struct FontBook {
    font: Option<FontArc>,
}

impl FontBook {
    /// Resolves a CSS-style family list against the system fonts, then any regular face at all.
    pub fn load(family_list: &str) -> Self {
        let db = font_db();
        let families = css_families(family_list);
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let font = db
            .query(&query)
            .and_then(|id| load_face(db, id))
            .or_else(|| {
                db.faces()
                    .filter(|face| face.style == Style::Normal)
                    .find_map(|face| load_face(db, face.id))
            });

        match font {
            Some(font) => Self { font: Some(font) },
            None => {
                warn!("no usable font for `{family_list}`; labels will render without text");
                Self::fallback()
            }
        }
    }

    /// Metrics only, nothing is drawn.
    pub fn fallback() -> Self {
        Self { font: None }
    }

    pub fn font(&self) -> Option<&FontArc> {
        self.font.as_ref()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Rendered width and height of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        match self.font.as_ref() {
            Some(font) => {
                let (w, h) = text_size(PxScale::from(size), font, text);
                (w as f32, h as f32)
            }
            None => (
                text.chars().count() as f32 * size * FALLBACK_ADVANCE,
                size,
            ),
        }
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("has_font", &self.has_font())
            .finish()
    }
}
