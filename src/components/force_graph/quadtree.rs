//! Point quadtree used by the many-body and collision forces.
//!
//! Built top-down from a set of points each tick; cells keep aggregates
//! (weighted centroid, total weight, largest radius) so distant clusters can
//! be approximated as single bodies.

const NONE: usize = usize::MAX;
const MAX_DEPTH: usize = 24;

#[derive(Clone, Debug)]
pub struct Quad {
	pub x0: f64,
	pub y0: f64,
	pub size: f64,
	pub children: [usize; 4],
	/// Point indices, only populated on leaves.
	pub points: Vec<usize>,
	/// Weighted centroid of the points below this cell.
	pub cx: f64,
	pub cy: f64,
	/// Sum of point weights below this cell.
	pub weight: f64,
	/// Largest point radius below this cell.
	pub max_radius: f64,
}

impl Quad {
	pub fn is_leaf(&self) -> bool {
		self.children.iter().all(|&c| c == NONE)
	}

	pub fn children(&self) -> impl Iterator<Item = usize> + '_ {
		self.children.iter().copied().filter(|&c| c != NONE)
	}

	pub fn x1(&self) -> f64 {
		self.x0 + self.size
	}

	pub fn y1(&self) -> f64 {
		self.y0 + self.size
	}
}

/// A point handed to [`QuadTree::build`].
#[derive(Clone, Copy, Debug)]
pub struct Point {
	pub x: f64,
	pub y: f64,
	pub weight: f64,
	pub radius: f64,
}

#[derive(Clone, Debug, Default)]
pub struct QuadTree {
	quads: Vec<Quad>,
}

impl QuadTree {
	pub fn build(points: &[Point]) -> Self {
		let mut tree = Self { quads: Vec::new() };
		if points.is_empty() {
			return tree;
		}

		let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
		let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for p in points {
			x0 = x0.min(p.x);
			y0 = y0.min(p.y);
			x1 = x1.max(p.x);
			y1 = y1.max(p.y);
		}
		let size = (x1 - x0).max(y1 - y0).max(1.0);

		let indices: Vec<usize> = (0..points.len()).collect();
		tree.insert(points, indices, x0, y0, size, 0);
		tree
	}

	pub fn root(&self) -> Option<&Quad> {
		self.quads.first()
	}

	pub fn quad(&self, idx: usize) -> &Quad {
		&self.quads[idx]
	}

	fn insert(
		&mut self,
		points: &[Point],
		indices: Vec<usize>,
		x0: f64,
		y0: f64,
		size: f64,
		depth: usize,
	) -> usize {
		let idx = self.quads.len();
		self.quads.push(Quad {
			x0,
			y0,
			size,
			children: [NONE; 4],
			points: Vec::new(),
			cx: 0.0,
			cy: 0.0,
			weight: 0.0,
			max_radius: 0.0,
		});

		if indices.len() <= 1 || depth >= MAX_DEPTH {
			let (mut sx, mut sy, mut w, mut r) = (0.0, 0.0, 0.0, 0.0_f64);
			let mut n = 0.0;
			for &i in &indices {
				let p = points[i];
				sx += p.x * p.weight.abs();
				sy += p.y * p.weight.abs();
				w += p.weight;
				r = r.max(p.radius);
				n += p.weight.abs();
			}
			let quad = &mut self.quads[idx];
			if n > 0.0 {
				quad.cx = sx / n;
				quad.cy = sy / n;
			} else if let Some(&i) = indices.first() {
				quad.cx = points[i].x;
				quad.cy = points[i].y;
			}
			quad.weight = w;
			quad.max_radius = r;
			quad.points = indices;
			return idx;
		}

		let half = size / 2.0;
		let (mx, my) = (x0 + half, y0 + half);
		let mut buckets: [Vec<usize>; 4] = Default::default();
		for i in indices {
			let p = points[i];
			let q = usize::from(p.x >= mx) | (usize::from(p.y >= my) << 1);
			buckets[q].push(i);
		}

		let (mut sx, mut sy, mut w, mut r, mut n) = (0.0, 0.0, 0.0, 0.0_f64, 0.0);
		for (q, bucket) in buckets.into_iter().enumerate() {
			if bucket.is_empty() {
				continue;
			}
			let cx0 = if q & 1 == 1 { mx } else { x0 };
			let cy0 = if q & 2 == 2 { my } else { y0 };
			let child = self.insert(points, bucket, cx0, cy0, half, depth + 1);
			let c = &self.quads[child];
			let cw = c.weight.abs();
			sx += c.cx * cw;
			sy += c.cy * cw;
			w += c.weight;
			n += cw;
			r = r.max(c.max_radius);
			self.quads[idx].children[q] = child;
		}

		let quad = &mut self.quads[idx];
		if n > 0.0 {
			quad.cx = sx / n;
			quad.cy = sy / n;
		} else {
			quad.cx = mx;
			quad.cy = my;
		}
		quad.weight = w;
		quad.max_radius = r;
		idx
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pt(x: f64, y: f64) -> Point {
		Point {
			x,
			y,
			weight: 1.0,
			radius: 2.0,
		}
	}

	#[test]
	fn root_aggregates_all_points() {
		let tree = QuadTree::build(&[pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 10.0), pt(10.0, 10.0)]);
		let root = tree.root().unwrap();
		assert_eq!(root.weight, 4.0);
		assert!((root.cx - 5.0).abs() < 1e-9);
		assert!((root.cy - 5.0).abs() < 1e-9);
		assert!(!root.is_leaf());
	}

	#[test]
	fn coincident_points_terminate_in_one_leaf() {
		let tree = QuadTree::build(&[pt(3.0, 3.0), pt(3.0, 3.0), pt(3.0, 3.0)]);
		let mut leaves = 0;
		let mut stack = vec![0];
		while let Some(i) = stack.pop() {
			let q = tree.quad(i);
			if q.is_leaf() {
				leaves += usize::from(!q.points.is_empty());
			} else {
				stack.extend(q.children());
			}
		}
		assert_eq!(leaves, 1);
	}

	#[test]
	fn empty_tree_has_no_root() {
		assert!(QuadTree::build(&[]).root().is_none());
	}
}
