//! Animated SVG artwork for therapy scenes
//!
//! Every scene is a 400x600 minimalist line drawing animated with embedded
//! CSS keyframes, so the output can be opened directly in a browser.

use rand::Rng;
use std::fmt::Write;

use crate::types::SceneId;

pub const VIEW_WIDTH: u32 = 400;
pub const VIEW_HEIGHT: u32 = 600;

/// Number of drifting particles in the forest scene
pub const FOREST_PARTICLES: usize = 12;

const KEYFRAMES: &str = "\
@keyframes sway { 0%, 100% { transform: rotate(-2deg); } 50% { transform: rotate(2deg); } }
@keyframes breathe { 0%, 100% { transform: scale(0.95); opacity: 0.1; } 50% { transform: scale(1.1); opacity: 0.2; } }
@keyframes wave { 0% { transform: translateX(0); } 100% { transform: translateX(-40px); } }
@keyframes spin-slow { from { transform: rotate(0deg); } to { transform: rotate(360deg); } }
@keyframes pulse { 0%, 100% { opacity: 1; } 50% { opacity: 0.5; } }
.sway { animation: sway 4s ease-in-out infinite; transform-origin: bottom; transform-box: fill-box; }
.sway-delayed { animation: sway 5s ease-in-out infinite 1s; transform-origin: bottom; transform-box: fill-box; }
.sway-slow { animation: sway 7s ease-in-out infinite 0.5s; transform-origin: bottom; transform-box: fill-box; }
.wave { animation: wave 8s linear infinite alternate; }
.wave-slow { animation: wave 12s linear infinite alternate-reverse; }
.wave-fast { animation: wave 6s linear infinite alternate; }
.breathe { animation: breathe 6s ease-in-out infinite; transform-origin: center; transform-box: fill-box; }
.spin-slow { animation: spin-slow 30s linear infinite; transform-origin: center; transform-box: fill-box; }
.pulse { animation: pulse 2s cubic-bezier(0.4, 0, 0.6, 1) infinite; }
";

/// Render the scene's SVG document. `rng` drives particle placement.
pub fn render_scene_svg<R: Rng>(id: SceneId, rng: &mut R) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = VIEW_WIDTH,
        h = VIEW_HEIGHT
    );
    let _ = writeln!(svg, "<style>\n{}</style>", KEYFRAMES);

    match id {
        SceneId::Forest => forest(&mut svg, rng),
        SceneId::Ocean => ocean(&mut svg),
        SceneId::Zen => zen(&mut svg),
    }

    svg.push_str("</svg>\n");
    svg
}

fn background(svg: &mut String, fill: &str) {
    let _ = writeln!(
        svg,
        r#"<rect width="{}" height="{}" fill="{}" />"#,
        VIEW_WIDTH, VIEW_HEIGHT, fill
    );
}

fn forest<R: Rng>(svg: &mut String, rng: &mut R) {
    background(svg, "#f0fdf4");

    svg.push_str(
        r##"<g class="sway">
  <path d="M200 500 L200 200" stroke="#10b981" stroke-width="4" stroke-linecap="round" />
  <path d="M200 350 L250 300" stroke="#10b981" stroke-width="3" stroke-linecap="round" />
  <path d="M200 400 L150 350" stroke="#10b981" stroke-width="3" stroke-linecap="round" />
  <circle cx="200" cy="200" r="40" fill="#34d399" fill-opacity="0.4" />
</g>
<g class="sway-delayed" opacity="0.6">
  <path d="M120 500 L120 300" stroke="#059669" stroke-width="4" stroke-linecap="round" />
  <circle cx="120" cy="300" r="30" fill="#10b981" fill-opacity="0.3" />
</g>
<g class="sway-slow">
  <path d="M280 500 L280 250" stroke="#059669" stroke-width="4" stroke-linecap="round" />
  <circle cx="280" cy="250" r="50" fill="#059669" fill-opacity="0.2" />
</g>
"##,
    );

    for i in 0..FOREST_PARTICLES {
        let from_x = rng.gen::<f64>() * VIEW_WIDTH as f64;
        let to_x = rng.gen::<f64>() * VIEW_WIDTH as f64;
        let dur = 6.0 + rng.gen::<f64>() * 8.0;
        let _ = writeln!(
            svg,
            r##"<circle r="2" fill="#10b981" fill-opacity="0.4"><animateTransform attributeName="transform" type="translate" from="{:.1} {}" to="{:.1} -50" dur="{:.2}s" begin="{:.1}s" repeatCount="indefinite" /></circle>"##,
            from_x,
            VIEW_HEIGHT,
            to_x,
            dur,
            i as f64 * 0.4
        );
    }
}

fn ocean(svg: &mut String) {
    background(svg, "#f0f9ff");
    svg.push_str(
        r##"<path d="M-100 300 Q100 250 200 300 T500 300 V600 H-100 Z" fill="#7dd3fc" fill-opacity="0.3" class="wave" />
<path d="M-100 350 Q100 400 200 350 T500 350 V600 H-100 Z" fill="#38bdf8" fill-opacity="0.2" class="wave-slow" />
<path d="M-100 400 Q100 370 200 400 T500 400 V600 H-100 Z" fill="#0ea5e9" fill-opacity="0.1" class="wave-fast" />
<circle cx="200" cy="150" r="60" fill="#fbbf24" fill-opacity="0.05" class="pulse" />
"##,
    );
}

fn zen(svg: &mut String) {
    background(svg, "#fdfcf0");
    svg.push_str(
        r##"<circle cx="200" cy="300" r="120" fill="none" stroke="#10b981" stroke-width="0.5" stroke-dasharray="4 8" class="spin-slow" />
<circle cx="200" cy="300" r="100" fill="none" stroke="#059669" stroke-width="15" stroke-opacity="0.08" class="breathe" />
<text x="200" y="305" text-anchor="middle" font-size="10" fill="#059669" font-weight="bold" letter-spacing="4" opacity="0.3">深 呼 吸</text>
"##,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_scene_is_a_complete_document() {
        let mut rng = StdRng::seed_from_u64(1);
        for id in SceneId::ALL {
            let svg = render_scene_svg(id, &mut rng);
            assert!(svg.starts_with("<svg "));
            assert!(svg.trim_end().ends_with("</svg>"));
            assert!(svg.contains("viewBox=\"0 0 400 600\""));
            assert!(svg.contains("@keyframes"));
        }
    }

    #[test]
    fn test_forest_has_drifting_particles() {
        let mut rng = StdRng::seed_from_u64(2);
        let svg = render_scene_svg(SceneId::Forest, &mut rng);
        assert_eq!(svg.matches("<animateTransform").count(), FOREST_PARTICLES);
        assert!(svg.contains("begin=\"4.4s\""));
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let a = render_scene_svg(SceneId::Forest, &mut StdRng::seed_from_u64(9));
        let b = render_scene_svg(SceneId::Forest, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_scene_specific_content() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            render_scene_svg(SceneId::Ocean, &mut rng)
                .matches("class=\"wave")
                .count(),
            3
        );
        assert!(render_scene_svg(SceneId::Zen, &mut rng).contains("深 呼 吸"));
    }
}
