// Dense 2D scalar container sized to the board
//
// All value computations are written against Field: element-wise arithmetic,
// per-cell extrema, mean normalisation and the generic frontier propagation
// sweep that every flood fill in the engine is built from.

use std::collections::VecDeque;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

use crate::types::Point;

/// Row-major grid of `height * width` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<T> {
    height: usize,
    width: usize,
    data: Vec<T>,
}

impl<T: Default + Clone> Field<T> {
    /// Creates a field with every cell at `T::default()`
    pub fn new(height: usize, width: usize) -> Self {
        Self::filled(height, width, T::default())
    }
}

impl<T: Clone> Field<T> {
    /// Creates a field with every cell set to `value`
    pub fn filled(height: usize, width: usize, value: T) -> Self {
        Field {
            height,
            width,
            data: vec![value; height * width],
        }
    }
}

impl<T> Field<T> {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether `p` lies on the grid
    pub fn contains(&self, p: Point) -> bool {
        p.row >= 0 && p.col >= 0 && (p.row as usize) < self.height && (p.col as usize) < self.width
    }

    pub fn get(&self, p: Point) -> Option<&T> {
        if self.contains(p) {
            Some(&self.data[p.row as usize * self.width + p.col as usize])
        } else {
            None
        }
    }

    /// Every point of the grid in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height * width).map(move |i| Point::new((i / width) as i32, (i % width) as i32))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Builds a new field by applying `f` to every cell
    pub fn map<U, F>(&self, f: F) -> Field<U>
    where
        F: FnMut(&T) -> U,
    {
        Field {
            height: self.height,
            width: self.width,
            data: self.data.iter().map(f).collect(),
        }
    }

    fn zip_with<U, V, F>(&self, other: &Field<U>, mut f: F) -> Field<V>
    where
        F: FnMut(&T, &U) -> V,
    {
        assert!(
            self.height == other.height && self.width == other.width,
            "field dimensions differ"
        );
        Field {
            height: self.height,
            width: self.width,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    /// Multi-source relaxation sweep
    ///
    /// Every seed is written and queued. Each dequeued point is handed to
    /// `relax` together with the current field and an updater; every
    /// `(point, value)` passed to the updater is written and queued in turn.
    /// The sweep ends when the queue drains, so `relax` must only emit
    /// strictly improving values.
    pub fn frontier_propagate<I, R>(&mut self, seeds: I, mut relax: R)
    where
        I: IntoIterator<Item = (Point, T)>,
        R: FnMut(&Field<T>, Point, &mut dyn FnMut(Point, T)),
    {
        let mut queue = VecDeque::new();
        for (p, value) in seeds {
            if self.contains(p) {
                self[p] = value;
                queue.push_back(p);
            }
        }

        let mut updates: Vec<(Point, T)> = Vec::new();
        while let Some(p) = queue.pop_front() {
            relax(self, p, &mut |q, value| updates.push((q, value)));
            for (q, value) in updates.drain(..) {
                if self.contains(q) {
                    self[q] = value;
                    queue.push_back(q);
                }
            }
        }
    }
}

impl<T: PartialOrd + Copy> Field<T> {
    /// Per-cell maximum against another field
    pub fn max_with(&self, other: &Field<T>) -> Field<T> {
        self.zip_with(other, |&a, &b| if b > a { b } else { a })
    }

    /// Per-cell minimum against another field
    pub fn min_with(&self, other: &Field<T>) -> Field<T> {
        self.zip_with(other, |&a, &b| if b < a { b } else { a })
    }
}

impl Field<f64> {
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Scales every cell so the mean becomes `target`
    ///
    /// A field with zero mean has no scale to adjust and is returned as is.
    pub fn standardize(&self, target: f64) -> Field<f64> {
        let mean = self.mean();
        if mean == 0.0 {
            return self.clone();
        }
        let scale = target / mean;
        self.map(|&v| v * scale)
    }
}

impl<T> Index<Point> for Field<T> {
    type Output = T;

    fn index(&self, p: Point) -> &T {
        assert!(self.contains(p), "point {:?} outside field", p);
        &self.data[p.row as usize * self.width + p.col as usize]
    }
}

impl<T> IndexMut<Point> for Field<T> {
    fn index_mut(&mut self, p: Point) -> &mut T {
        assert!(self.contains(p), "point {:?} outside field", p);
        &mut self.data[p.row as usize * self.width + p.col as usize]
    }
}

/// `(row, col)` access for callers working in unsigned grid coordinates
impl<T> Index<(usize, usize)> for Field<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.height && col < self.width, "({}, {}) outside field", row, col);
        &self.data[row * self.width + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Field<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.height && col < self.width, "({}, {}) outside field", row, col);
        &mut self.data[row * self.width + col]
    }
}

impl<'a, T, U> Add<&'a Field<U>> for &'a Field<T>
where
    T: Add<U> + Copy,
    U: Copy,
{
    type Output = Field<<T as Add<U>>::Output>;

    fn add(self, rhs: &'a Field<U>) -> Self::Output {
        self.zip_with(rhs, |&a, &b| a + b)
    }
}

impl<'a, T, U> Sub<&'a Field<U>> for &'a Field<T>
where
    T: Sub<U> + Copy,
    U: Copy,
{
    type Output = Field<<T as Sub<U>>::Output>;

    fn sub(self, rhs: &'a Field<U>) -> Self::Output {
        self.zip_with(rhs, |&a, &b| a - b)
    }
}

impl<'a, T, S> Mul<S> for &'a Field<T>
where
    T: Mul<S> + Copy,
    S: Copy,
{
    type Output = Field<<T as Mul<S>>::Output>;

    fn mul(self, rhs: S) -> Self::Output {
        self.map(|&a| a * rhs)
    }
}
