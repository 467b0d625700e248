use crate::RenderError;

/// Convert SVG string to PNG bytes at the given DPI.
///
/// Text is set with system fonts; the first entry of `font_family` becomes
/// the default family.
pub fn svg_to_png(svg: &str, dpi: u32, font_family: &str) -> crate::Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(first) = font_family.split(',').map(str::trim).find(|f| !f.is_empty()) {
        opt.font_family = first.to_string();
    }

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Svg(e.to_string()))?;

    let scale = dpi.max(1) as f32 / 72.0;
    let size = tree.size();
    let w = (size.width() * scale).ceil() as u32;
    let h = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| RenderError::Png(format!("failed to create {w}x{h} pixmap")))?;

    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| RenderError::Png(e.to_string()))
}
