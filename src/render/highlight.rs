use glam::{IVec3, Vec3};

use crate::constants::HIGHLIGHT_MARGIN;
use crate::core::vertex::Vertex;

const HIGHLIGHT_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// Line-list outline of the block at `pos`, slightly inflated so it does not
/// z-fight with the block's faces.
pub fn highlight_lines(pos: IVec3) -> Vec<Vertex> {
    let min = pos.as_vec3() - Vec3::splat(HIGHLIGHT_MARGIN);
    let max = (pos + IVec3::ONE).as_vec3() + Vec3::splat(HIGHLIGHT_MARGIN);
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    };

    let mut lines = Vec::with_capacity(24);
    // Corners differing in exactly one bit share an edge.
    for a in 0..8usize {
        for bit in [1, 2, 4] {
            if a & bit == 0 {
                for i in [a, a | bit] {
                    lines.push(Vertex {
                        position: corner(i).to_array(),
                        normal: [0.0, 1.0, 0.0],
                        color: HIGHLIGHT_COLOR,
                        uv: [0.0, 0.0],
                    });
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_edges_around_an_inflated_box() {
        let lines = highlight_lines(IVec3::new(2, 3, 4));
        assert_eq!(lines.len(), 24);
        for v in &lines {
            let [x, y, z] = v.position;
            assert!(x == 2.0 - HIGHLIGHT_MARGIN || x == 3.0 + HIGHLIGHT_MARGIN);
            assert!(y == 3.0 - HIGHLIGHT_MARGIN || y == 4.0 + HIGHLIGHT_MARGIN);
            assert!(z == 4.0 - HIGHLIGHT_MARGIN || z == 5.0 + HIGHLIGHT_MARGIN);
        }
        for pair in lines.chunks(2) {
            let a = Vec3::from_array(pair[0].position);
            let b = Vec3::from_array(pair[1].position);
            assert!(((a - b).length() - (1.0 + 2.0 * HIGHLIGHT_MARGIN)).abs() < 1e-5);
        }
    }
}
