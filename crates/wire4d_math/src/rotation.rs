//! Rotation matrix construction
//!
//! In d dimensions rotations happen in planes. A rotation is described by two
//! (not necessarily orthogonal) vectors spanning the plane and an angle.

use crate::matrix::MatrixTrait;
use crate::vector::{Field, VectorTrait, EPSILON};

/// Rotation in the plane spanned by `v1` and `v2`.
///
/// As a matrix-vector product the result turns `v1` toward `v2`; applied on the
/// right of a row-frame (`frame.dot(r)`) it turns row `v1` away from `v2`.
/// With `angle = None` the rotation angle is the one between the two vectors,
/// so `rotation_matrix(a, b, None) * a` is parallel to `b`.
///
/// Parallel inputs span no plane and give the identity.
pub fn rotation_matrix<V: VectorTrait>(v1: V, v2: V, angle: Option<Field>) -> V::M {
    let u = v1.normalized();
    let v = v2.normalized();

    let (cos, sin) = match angle {
        Some(th) => (th.cos(), th.sin()),
        None => {
            let c = u.dot(v).clamp(-1.0, 1.0);
            (c, (1.0 - c * c).max(0.0).sqrt())
        }
    };

    let w = v - u * u.dot(v);
    if w.length_squared() < EPSILON * EPSILON {
        return V::M::identity();
    }
    let w = w.normalized();

    let r1 = u * cos - w * sin;
    let r2 = u * sin + w * cos;

    V::M::identity() + V::M::outer(u, r1 - u) + V::M::outer(w, r2 - w)
}

/// Rotation in the coordinate plane `(p1, p2)`.
///
/// # Arguments
/// * `angle` - Rotation angle in radians
/// * `p1`, `p2` - Indices of the axes forming the rotation plane (0=X, 1=Y, 2=Z, 3=W)
pub fn plane_rotation<V: VectorTrait>(angle: Field, p1: usize, p2: usize) -> V::M {
    let cs = angle.cos();
    let sn = angle.sin();

    let mut m = V::M::identity();
    m[p1][p1] = cs;
    m[p2][p2] = cs;
    m[p1][p2] = -sn;
    m[p2][p1] = sn;

    m
}
