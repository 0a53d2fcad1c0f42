//! The four demo stages, from a bare clear up to the rotating cube.
//!
//! A stage is pure configuration: which shaders, which geometry, whether
//! depth testing and animation are on. The driver does the work.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::geometry::{cube, triangle, Mesh};
use crate::paint::Color;
use crate::shader::ShaderSource;

const FLAT_VERT: &str = include_str!("shaders/flat.vert.wgsl");
const TRANSFORM_VERT: &str = include_str!("shaders/transform.vert.wgsl");
const COLOR_FRAG: &str = include_str!("shaders/color.frag.wgsl");

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Stage {
    /// Clear to black, draw nothing.
    Clear,
    /// One flat-shaded triangle.
    Triangle,
    /// Static cube in clip space, depth tested.
    Cube,
    /// Cube under a perspective projection, rotating every frame.
    #[default]
    RotatingCube,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage `{0}` (expected one of: clear, triangle, cube, rotating-cube)")]
pub struct UnknownStage(pub String);

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Clear, Stage::Triangle, Stage::Cube, Stage::RotatingCube];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Clear => "clear",
            Stage::Triangle => "triangle",
            Stage::Cube => "cube",
            Stage::RotatingCube => "rotating-cube",
        }
    }

    /// Window title.
    pub fn title(self) -> &'static str {
        match self {
            Stage::Clear => "cubestage: clear",
            Stage::Triangle => "cubestage: triangle",
            Stage::Cube => "cubestage: cube",
            Stage::RotatingCube => "cubestage: rotating cube",
        }
    }

    pub fn clear_color(self) -> Color {
        Color::BLACK
    }

    /// Vertex and fragment sources, or `None` for a stage that only clears.
    pub fn shaders(self) -> Option<(ShaderSource, ShaderSource)> {
        let vertex = match self {
            Stage::Clear => return None,
            Stage::Triangle | Stage::Cube => ShaderSource::vertex("flat.vert", FLAT_VERT),
            Stage::RotatingCube => ShaderSource::vertex("transform.vert", TRANSFORM_VERT),
        };
        Some((vertex, ShaderSource::fragment("color.frag", COLOR_FRAG)))
    }

    pub fn mesh(self) -> Result<Option<Mesh>> {
        Ok(match self {
            Stage::Clear => None,
            Stage::Triangle => Some(triangle()?),
            Stage::Cube | Stage::RotatingCube => Some(cube()?),
        })
    }

    pub fn depth_test(self) -> bool {
        matches!(self, Stage::Cube | Stage::RotatingCube)
    }

    pub fn animated(self) -> bool {
        matches!(self, Stage::RotatingCube)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{load_program, COLOR, POSITION};
    use crate::transform::{MODEL_MATRIX, PROJECTION_MATRIX, VIEW_MATRIX};

    // ── naming ────────────────────────────────────────────────────────────

    #[test]
    fn names_round_trip_through_from_str() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "sphere".parse::<Stage>().unwrap_err();
        assert_eq!(err, UnknownStage("sphere".into()));
        assert!(err.to_string().contains("rotating-cube"));
    }

    #[test]
    fn default_is_rotating_cube() {
        assert_eq!(Stage::default(), Stage::RotatingCube);
    }

    // ── shaders ───────────────────────────────────────────────────────────

    #[test]
    fn every_drawing_stage_loads_with_position_and_color() {
        for stage in Stage::ALL {
            let Some((vs, fs)) = stage.shaders() else {
                assert_eq!(stage, Stage::Clear);
                continue;
            };
            let program = load_program(stage.name(), &vs, &fs).unwrap();
            assert_eq!(program.attribute_location(POSITION), Some(0));
            assert_eq!(program.attribute_location(COLOR), Some(1));
        }
    }

    #[test]
    fn only_the_animated_stage_has_transform_uniforms() {
        for stage in Stage::ALL {
            let Some((vs, fs)) = stage.shaders() else { continue };
            let program = load_program(stage.name(), &vs, &fs).unwrap();
            let has = [MODEL_MATRIX, VIEW_MATRIX, PROJECTION_MATRIX]
                .iter()
                .all(|name| program.uniform(name).is_some());
            assert_eq!(has, stage.animated(), "{stage}");
        }
    }

    #[test]
    fn flat_shader_puts_the_red_face_nearest() {
        use crate::geometry::{CUBE_POSITIONS, FACE_COLORS};

        assert!(FLAT_VERT.contains("0.5 - position.z * 0.5"));
        let depth = |z: f32| 0.5 - z * 0.5;

        // First face: z = +0.5, red. Second face: z = -0.5, green.
        let front_z = CUBE_POSITIONS[2];
        let back_z = CUBE_POSITIONS[6 * 3 + 2];
        assert_eq!(FACE_COLORS[0], Color::RED);
        assert_eq!(FACE_COLORS[1], Color::GREEN);
        assert!(depth(front_z) < depth(back_z));
        assert!((0.0..=1.0).contains(&depth(1.0)) && (0.0..=1.0).contains(&depth(-1.0)));
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn meshes_match_stage() {
        assert!(Stage::Clear.mesh().unwrap().is_none());
        assert_eq!(Stage::Triangle.mesh().unwrap().unwrap().vertex_count(), 3);
        assert_eq!(Stage::Cube.mesh().unwrap().unwrap().vertex_count(), 36);
        assert_eq!(Stage::RotatingCube.mesh().unwrap().unwrap().vertex_count(), 36);
    }

    #[test]
    fn cube_stages_depth_test() {
        assert!(!Stage::Clear.depth_test());
        assert!(!Stage::Triangle.depth_test());
        assert!(Stage::Cube.depth_test());
        assert!(Stage::RotatingCube.depth_test());
    }
}
