//! Axis-label markup and text metrics.
//!
//! Labels arrive in two dialects: ROOT TLatex (`Reco PV x-position [#mum]`) and
//! matplotlib mathtext (`PV x-pos. [$\mu$m]`). Both are converted to plain
//! Unicode before they reach the canvas.

use ab_glyph::{Font, ScaleFont};

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Extent of `text` set in `font` at `size_pt`, with kerning.
pub fn measure_text<F: Font>(font: &F, text: &str, size_pt: f64) -> TextMetrics {
    let scaled = font.as_scaled(ab_glyph::PxScale::from(size_pt as f32));
    let mut width = 0.0_f32;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    let (ascent, descent) = (scaled.ascent(), scaled.descent());
    TextMetrics { width: f64::from(width), height: f64::from(ascent - descent), ascent: f64::from(ascent) }
}

/// Average advance of a sans-serif glyph, as a fraction of the font size.
const AVG_ADVANCE: f64 = 0.55;

/// Fixed-advance estimate, used when no system font can be loaded.
pub fn estimate_text(text: &str, size_pt: f64) -> TextMetrics {
    let chars = text.chars().count() as f64;
    TextMetrics { width: chars * size_pt * AVG_ADVANCE, height: size_pt * 1.2, ascent: size_pt * 0.9 }
}

const GREEK: &[(&str, char)] = &[
    ("alpha", 'α'),
    ("beta", 'β'),
    ("gamma", 'γ'),
    ("delta", 'δ'),
    ("epsilon", 'ε'),
    ("eta", 'η'),
    ("theta", 'θ'),
    ("lambda", 'λ'),
    ("mu", 'μ'),
    ("nu", 'ν'),
    ("pi", 'π'),
    ("rho", 'ρ'),
    ("sigma", 'σ'),
    ("tau", 'τ'),
    ("phi", 'φ'),
    ("chi", 'χ'),
    ("psi", 'ψ'),
    ("omega", 'ω'),
    ("Gamma", 'Γ'),
    ("Delta", 'Δ'),
    ("Theta", 'Θ'),
    ("Lambda", 'Λ'),
    ("Sigma", 'Σ'),
    ("Phi", 'Φ'),
    ("Omega", 'Ω'),
    ("pm", '±'),
    ("times", '×'),
    ("cdot", '·'),
    ("rightarrow", '→'),
];

/// Longest symbol name that prefixes `s`.
fn symbol_prefix(s: &str) -> Option<(&'static str, char)> {
    GREEK
        .iter()
        .filter(|(name, _)| s.starts_with(name))
        .max_by_key(|(name, _)| name.len())
        .copied()
}

/// Convert ROOT (`#mu`) and matplotlib (`$\mu$`) label markup to Unicode.
///
/// Unknown `#name` / `\name` sequences are kept verbatim; `$` delimiters and
/// the braces of `^{}` / `_{}` groups inside math are dropped.
pub fn to_unicode(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_math = false;
    let mut rest = label;
    while let Some(ch) = rest.chars().next() {
        let after = &rest[ch.len_utf8()..];
        match ch {
            '#' | '\\' if ch == '#' || in_math => {
                if let Some((name, sym)) = symbol_prefix(after) {
                    out.push(sym);
                    rest = &after[name.len()..];
                    continue;
                }
                out.push(ch);
            }
            '$' => in_math = !in_math,
            '{' | '}' | '^' | '_' if in_math => {}
            _ => out.push(ch),
        }
        rest = after;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_mu() {
        assert_eq!(to_unicode("Reco PV x-position [#mum]"), "Reco PV x-position [μm]");
        assert_eq!(to_unicode("#Delta#phi"), "Δφ");
    }

    #[test]
    fn mathtext_mu() {
        assert_eq!(to_unicode(r"PV x-pos. [$\mu$m]"), "PV x-pos. [μm]");
        assert_eq!(to_unicode(r"$p_{T}$ [GeV]"), "pT [GeV]");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(to_unicode("Events"), "Events");
        assert_eq!(to_unicode("#unknown and a\\backslash"), "#unknown and a\\backslash");
    }

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(to_unicode("#theta"), "θ");
        assert_eq!(to_unicode("#epsilon"), "ε");
    }

    #[test]
    fn glyph_advances_differ() {
        let fonts = crate::font::for_family("DejaVu Sans, sans-serif").unwrap();
        let wide = measure_text(&fonts.regular, "WWWWWWWWWW", 12.0);
        let narrow = measure_text(&fonts.regular, "iiiiiiiiii", 12.0);
        assert!(wide.width > 2.0 * narrow.width);
        assert!(wide.height > 8.0 && wide.ascent > 0.0);
    }

    #[test]
    fn bold_is_not_narrower() {
        let fonts = crate::font::for_family("DejaVu Sans, sans-serif").unwrap();
        let r = measure_text(&fonts.regular, "Entries", 12.0);
        let b = measure_text(fonts.select(true), "Entries", 12.0);
        assert!(b.width >= r.width);
    }

    #[test]
    fn estimate_grows_with_length() {
        let a = estimate_text("ab", 10.0);
        let b = estimate_text("abcd", 10.0);
        assert!(b.width > a.width);
        assert!((a.height - 12.0).abs() < 1e-9);
    }
}
