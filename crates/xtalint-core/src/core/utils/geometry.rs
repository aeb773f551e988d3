use nalgebra::{Point3, Vector3};

/// An axis-aligned box enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// The smallest box containing every point, or `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: acc.min.inf(p),
                max: acc.max.sup(p),
            },
        ))
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// The union of several boxes, or `None` if there are none.
    pub fn union_all<'a, I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        boxes.into_iter().fold(None, |acc: Option<BoundingBox>, b| {
            Some(match acc {
                Some(acc) => acc.union(b),
                None => *b,
            })
        })
    }

    pub fn translated(&self, shift: &Vector3<f64>) -> BoundingBox {
        BoundingBox {
            min: self.min + shift,
            max: self.max + shift,
        }
    }

    /// Whether the boxes come within `margin` of each other along every axis.
    ///
    /// Two point sets whose boxes fail this test cannot contain a pair of
    /// points closer than `margin`.
    pub fn overlaps(&self, other: &BoundingBox, margin: f64) -> bool {
        (0..3).all(|axis| {
            self.min[axis] - margin <= other.max[axis] && other.min[axis] - margin <= self.max[axis]
        })
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Arithmetic mean of a set of points, or `None` for an empty set.
pub fn centroid<'a, I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let (sum, count) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, n), p| (sum + p.coords, n + 1));
    (count > 0).then(|| Point3::from(sum / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_encloses_all_points() {
        let points = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-4.0, 5.0, 0.5),
            Point3::new(2.0, 0.0, -1.0),
        ];
        let bb = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bb.min, Point3::new(-4.0, -2.0, -1.0));
        assert_eq!(bb.max, Point3::new(2.0, 5.0, 3.0));
    }

    #[test]
    fn from_points_returns_none_for_empty_set() {
        let empty: Vec<Point3<f64>> = Vec::new();
        assert!(BoundingBox::from_points(&empty).is_none());
        assert!(centroid(&empty).is_none());
    }

    #[test]
    fn overlaps_respects_margin_on_each_axis() {
        let a = BoundingBox::from_points(&[Point3::origin(), Point3::new(1.0, 1.0, 1.0)]).unwrap();
        let b = a.translated(&Vector3::new(4.0, 0.0, 0.0));
        assert!(!a.overlaps(&b, 2.5));
        assert!(a.overlaps(&b, 3.0));
        assert!(b.overlaps(&a, 3.0));

        let c = a.translated(&Vector3::new(0.0, 0.0, 10.0));
        assert!(!a.overlaps(&c, 3.0));
    }

    #[test]
    fn union_all_combines_boxes() {
        let a = BoundingBox::from_points(&[Point3::origin()]).unwrap();
        let b = a.translated(&Vector3::new(3.0, -1.0, 2.0));
        let u = BoundingBox::union_all(&[a, b]).unwrap();
        assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Point3::new(3.0, 0.0, 2.0));
        assert_eq!(u.center(), Point3::new(1.5, -0.5, 1.0));
        assert!(BoundingBox::union_all(&[]).is_none());
    }

    #[test]
    fn centroid_is_mean_position() {
        let c = centroid(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -6.0)]).unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, -3.0));
    }
}
