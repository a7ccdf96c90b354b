/// Cubic Bezier timing curve with fixed end points `(0, 0)` and `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierCurve {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BezierCurve {
    const ITERATIONS: usize = 5;
    const EPSILON: f32 = 1e-5;

    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_linear(&self) -> bool {
        self.x1 == self.y1 && self.x2 == self.y2
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        Self::interpolate(t, self.x1, self.y1, self.x2, self.y2)
    }

    /// Finds the curve parameter whose X equals `t` and returns the Y at that parameter.
    ///
    /// The X components of the control points are expected to keep X monotonic in `[0, 1]`,
    /// which holds for every curve MMD can author.
    pub fn interpolate(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
        if x1 == y1 && x2 == y2 {
            return t;
        }

        let mut s = t.clamp(0.0, 1.0);

        for _ in 0..Self::ITERATIONS {
            let error = cubic(s, x1, x2) - t;

            if error.abs() < Self::EPSILON {
                break;
            }

            let slope = cubic_derivative(s, x1, x2);

            if slope.abs() < f32::EPSILON {
                break;
            }

            s = (s - error / slope).clamp(0.0, 1.0);
        }

        cubic(s, y1, y2)
    }
}

fn cubic(s: f32, p1: f32, p2: f32) -> f32 {
    let r = 1.0 - s;
    3.0 * r * r * s * p1 + 3.0 * r * s * s * p2 + s * s * s
}

fn cubic_derivative(s: f32, p1: f32, p2: f32) -> f32 {
    let r = 1.0 - s;
    3.0 * r * r * p1 + 6.0 * r * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}
