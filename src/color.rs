use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_rgb(hue, 0.75, 0.55)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// Map a correlation value in [-1, 1] to a diverging blue–white–red colour,
/// centred (white) at zero. Values outside the range are clamped.
pub fn diverging(value: f64) -> RGBColor {
    let t = value.clamp(-1.0, 1.0) as f32;
    // hue 220 (blue) for negative, 4 (red) for positive; magnitude drives
    // saturation and pulls lightness down from white.
    let (hue, mag) = if t < 0.0 { (220.0, -t) } else { (4.0, t) };
    hsl_to_rgb(hue, 0.65 * mag + 0.1, 1.0 - 0.45 * mag)
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> RGBColor {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    RGBColor(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}
