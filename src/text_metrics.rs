use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

const FALLBACK_CHAR_WIDTH: f32 = 0.6;
const BOLD_WIDTH_FACTOR: f32 = 1.08;

/// Advance width of `text` in the first installed face of `font_family`.
/// Falls back to a per-character estimate when no face is available.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = TEXT_MEASURER
        .lock()
        .ok()
        .and_then(|mut guard| guard.measure(text, font_size, font_family, bold));
    measured.unwrap_or_else(|| estimate_width(text, font_size, bold))
}

pub fn estimate_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let factor = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
    let width: f32 = text
        .chars()
        .map(|ch| match ch {
            ' ' | '(' | ')' | '.' | ',' | 'i' | 'l' | 'I' | 'j' | 'f' | 't' | 'r' => 0.32,
            'M' | 'W' | 'm' | 'w' => 0.86,
            'A'..='Z' => 0.68,
            _ => FALLBACK_CHAR_WIDTH,
        })
        .sum();
    width * font_size * factor
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<(String, bool), Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let key = (font_family.trim().to_string(), bold);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family, bold);
            if face.is_none() {
                tracing::debug!(font_family, "no installed face, estimating label widths");
            }
            self.cache.insert(key.clone(), face);
        }
        self.cache.get(&key)?.as_ref()?.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str, bold: bool) -> Option<FontFace> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" => Family::Monospace,
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * FALLBACK_CHAR_WIDTH;

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum();
            return Some(width);
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        let width: f32 = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| advance as f32 * scale)
                    .unwrap_or(fallback)
            })
            .sum();
        Some(width)
    }
}
