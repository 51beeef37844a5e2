//! Deterministic status colors: evenly spaced hues in HSV.

use std::collections::BTreeMap;

const SATURATION: f64 = 0.7;
const VALUE: f64 = 0.9;

/// HSV (all components in 0..=1) to RGB (0..=1).
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

fn channel(c: f64) -> u8 {
    (c * 255.0).floor().clamp(0.0, 255.0) as u8
}

/// `n` distinct "#rrggbb" colors with hue i/n.
pub fn generate_palette(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let (r, g, b) = hsv_to_rgb(i as f64 / n as f64, SATURATION, VALUE);
            format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
        })
        .collect()
}

/// Zip ordered statuses with the palette.
pub fn assign_colors(statuses: &[String]) -> BTreeMap<String, String> {
    statuses
        .iter()
        .cloned()
        .zip(generate_palette(statuses.len()))
        .collect()
}
