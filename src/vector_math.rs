/// Euclidean distance between two points.
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    magnitude(x1 - x2, y1 - y2)
}

pub fn magnitude(x: f32, y: f32) -> f32 {
    (x * x + y * y).sqrt()
}

/// Unit vector in the direction of `(x, y)`, or `(0, 0)` for a zero vector.
pub fn normalize(x: f32, y: f32) -> (f32, f32) {
    let length = magnitude(x, y);
    if length == 0.0 {
        (0.0, 0.0)
    } else {
        (x / length, y / length)
    }
}
