use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeometryExtent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl GeometryExtent {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }
}

impl From<(f64, f64, f64, f64)> for GeometryExtent {
    fn from((minx, miny, maxx, maxy): (f64, f64, f64, f64)) -> Self {
        GeometryExtent {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_of_edges() {
        let e = GeometryExtent::from((-123.5, 38.1, -122.3, 38.9));
        assert!(e.contains(-122.9, 38.5));
        assert!(e.contains(-123.5, 38.1));
        assert!(e.contains(-122.3, 38.9));
        assert!(!e.contains(-124.0, 38.5));
        assert!(!e.contains(-122.9, 40.0));
    }
}
