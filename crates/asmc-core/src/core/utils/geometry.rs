use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use thiserror::Error;
use tracing::debug;

const MIN_FIT_POINTS: usize = 3;
const COLLINEARITY_TOLERANCE: f64 = 1e-10;
const KD_TREE_BUCKET_SIZE: usize = 32;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Point sets differ in size: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("Rigid fit needs at least {MIN_FIT_POINTS} points, got {0}")]
    TooFewPoints(usize),

    #[error("Point set is collinear or coincident; rotation is underdetermined")]
    Degenerate,

    #[error("Singular value decomposition failed")]
    Decomposition,
}

/// A proper rotation followed by a translation: `x' = R·x + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    pub fn apply_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Superposition {
    pub transform: RigidTransform,
    pub rmsd: f64,
}

/// Finds the rigid transform that best maps `points_b` onto `points_a`.
///
/// `points_a[i]` corresponds to `points_b[i]`. The returned transform minimizes the
/// sum of squared distances between the transformed `points_b` and `points_a`
/// (Kabsch algorithm with reflection correction). Nothing is moved; apply the
/// transform to whichever coordinates need it.
///
/// # Errors
///
/// Returns [`GeometryError`] if the lists differ in length, hold fewer than three
/// points, or either list is collinear.
pub fn fit_rigid(
    points_a: &[Point3<f64>],
    points_b: &[Point3<f64>],
) -> Result<Superposition, GeometryError> {
    if points_a.len() != points_b.len() {
        return Err(GeometryError::LengthMismatch(points_a.len(), points_b.len()));
    }
    if points_a.len() < MIN_FIT_POINTS {
        return Err(GeometryError::TooFewPoints(points_a.len()));
    }

    let centroid_a = centroid(points_a);
    let centroid_b = centroid(points_b);

    if is_collinear(points_a, &centroid_a) || is_collinear(points_b, &centroid_b) {
        return Err(GeometryError::Degenerate);
    }

    let mut covariance = Matrix3::zeros();
    for (a, b) in points_a.iter().zip(points_b) {
        covariance += (b - centroid_b) * (a - centroid_a).transpose();
    }

    let svd = covariance.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(GeometryError::Decomposition),
    };
    let v = v_t.transpose();
    let u_t = u.transpose();

    let mut correction = Matrix3::<f64>::identity();
    if (v * u_t).determinant() < 0.0 {
        let smallest = svd
            .singular_values
            .iter()
            .enumerate()
            .min_by(|(_, x), (_, y)| x.total_cmp(y))
            .map(|(i, _)| i)
            .unwrap_or(2);
        correction[(smallest, smallest)] = -1.0;
    }

    let rotation = Rotation3::from_matrix_unchecked(v * correction * u_t);
    let translation = centroid_a.coords - rotation * centroid_b.coords;
    let transform = RigidTransform {
        rotation,
        translation,
    };

    let squared_sum: f64 = points_a
        .iter()
        .zip(points_b)
        .map(|(a, b)| (a - transform.apply(b)).norm_squared())
        .sum();
    let rmsd = (squared_sum / points_a.len() as f64).sqrt();

    Ok(Superposition { transform, rmsd })
}

pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len().max(1) as f64)
}

fn is_collinear(points: &[Point3<f64>], center: &Point3<f64>) -> bool {
    let mut scatter = Matrix3::zeros();
    for p in points {
        let d = p - center;
        scatter += d * d.transpose();
    }
    let mut eigenvalues: Vec<f64> = scatter.symmetric_eigenvalues().iter().copied().collect();
    eigenvalues.sort_by(|a, b| b.total_cmp(a));
    eigenvalues[1] <= COLLINEARITY_TOLERANCE * eigenvalues[0].max(f64::MIN_POSITIVE)
}

/// Closest candidate to `query` as `(index, distance)`.
///
/// Exact ties resolve to the earliest candidate. Returns `None` when there are no candidates.
pub fn nearest(query: &Point3<f64>, candidates: &[Point3<f64>]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let d2 = (candidate - query).norm_squared();
        if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, d2)| (i, d2.sqrt()))
}

/// A k-d tree over a fixed point set, answering [`nearest`] queries with the same tie rule.
///
/// Point sets where too many points share a coordinate on one axis cannot be split into
/// tree buckets; those are kept as a plain list and searched linearly.
pub struct NeighborIndex {
    tree: Option<KdTree<f64, 3>>,
    points: Vec<Point3<f64>>,
}

impl NeighborIndex {
    pub fn new(points: &[Point3<f64>]) -> Self {
        let tree = if splittable(points) {
            let entries: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
            Some((&entries).into())
        } else {
            debug!(
                points = points.len(),
                "Point set has a crowded axis value; using linear neighbour search."
            );
            None
        };
        Self {
            tree,
            points: points.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn nearest(&self, query: &Point3<f64>) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let Some(tree) = &self.tree else {
            return nearest(query, &self.points);
        };
        let q = [query.x, query.y, query.z];
        let closest = tree.nearest_one::<SquaredEuclidean>(&q);
        let radius = closest.distance + closest.distance * 1e-12 + 1e-12;

        let (index, d2) = tree
            .within::<SquaredEuclidean>(&q, radius)
            .into_iter()
            .map(|n| (n.item as usize, n.distance))
            .chain(std::iter::once((closest.item as usize, closest.distance)))
            .min_by(|(i, a), (j, b)| a.total_cmp(b).then(i.cmp(j)))?;
        Some((index, d2.sqrt()))
    }
}

/// Whether every axis value is shared by fewer points than a tree bucket holds.
fn splittable(points: &[Point3<f64>]) -> bool {
    (0..3).all(|axis| {
        let mut values: Vec<f64> = points.iter().map(|p| p[axis] + 0.0).collect();
        values.sort_by(f64::total_cmp);
        values
            .chunk_by(|a, b| a == b)
            .all(|run| run.len() < KD_TREE_BUCKET_SIZE)
    })
}
