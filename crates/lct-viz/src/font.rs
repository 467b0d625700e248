//! System font faces used for text measurement.
//!
//! Faces are resolved from a CSS-style family list (`"Helvetica, Arial,
//! sans-serif"`) against the system font database, the same database the PNG
//! rasterizer sets text with. Resolved handles are cached per family list.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use ab_glyph::FontVec;
use usvg::fontdb::{self, Database, Family, Query};

use crate::{RenderError, Result};

pub struct FontHandle {
    pub regular: FontVec,
    pub bold: FontVec,
}

impl FontHandle {
    /// Resolve the first available family of `families` in `db`.
    ///
    /// Falls back to any installed face when none of the families match.
    pub fn load(db: &Database, families: &str) -> Result<Self> {
        Ok(Self {
            regular: face(db, families, fontdb::Weight::NORMAL)?,
            bold: face(db, families, fontdb::Weight::BOLD)?,
        })
    }

    pub fn select(&self, bold: bool) -> &FontVec {
        if bold { &self.bold } else { &self.regular }
    }
}

fn parse_families(list: &str) -> Vec<Family<'_>> {
    list.split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|f| !f.is_empty())
        .map(|f| match f {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        })
        .collect()
}

fn face(db: &Database, families: &str, weight: fontdb::Weight) -> Result<FontVec> {
    let families = parse_families(families);
    let id = families
        .iter()
        .find_map(|family| {
            db.query(&Query {
                families: std::slice::from_ref(family),
                weight,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            })
        })
        .or_else(|| db.faces().next().map(|info| info.id))
        .ok_or_else(|| RenderError::Font("no fonts installed".into()))?;

    db.with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index))
        .ok_or_else(|| RenderError::Font(format!("face {id:?} has no data")))?
        .map_err(|e| RenderError::Font(e.to_string()))
}

fn system_database() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        db
    })
}

/// Cached faces for `families`, or `None` when no font can be loaded.
pub fn for_family(families: &str) -> Option<Arc<FontHandle>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Option<Arc<FontHandle>>>>> = OnceLock::new();
    let mut cache = CACHE.get_or_init(Default::default).lock().ok()?;
    cache
        .entry(families.to_string())
        .or_insert_with(|| FontHandle::load(system_database(), families).ok().map(Arc::new))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_list_parsing() {
        let families = parse_families("'TeX Gyre Heros', Helvetica, , sans-serif");
        assert!(matches!(families[0], Family::Name("TeX Gyre Heros")));
        assert!(matches!(families[1], Family::Name("Helvetica")));
        assert!(matches!(families[2], Family::SansSerif));
        assert_eq!(families.len(), 3);
    }

    #[test]
    fn empty_database_is_an_error() {
        let err = FontHandle::load(&Database::new(), "sans-serif").err().unwrap();
        assert!(err.to_string().contains("no fonts installed"));
    }

    #[test]
    fn system_faces_are_cached() {
        let a = for_family("DejaVu Sans, sans-serif").unwrap();
        let b = for_family("DejaVu Sans, sans-serif").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
