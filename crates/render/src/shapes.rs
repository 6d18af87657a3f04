//! Debug shape batching: lines, boxes and coordinate bases drawn over the
//! frame with a stack of color and transform state.

use glam::{Mat4, Vec3};
use scenekit_common::Aabb;
use std::ops::{Deref, DerefMut};

/// Packed color, `0xAABBGGRR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color4u(pub u32);

impl Color4u {
    pub const WHITE: Self = Self(0xffff_ffff);
    pub const RED: Self = Self(0xff00_00ff);
    pub const GREEN: Self = Self(0xff00_ff00);
    pub const BLUE: Self = Self(0xffff_0000);

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_le_bytes([r, g, b, a]))
    }
}

/// Immediate-mode debug shape renderer with pushable color and transform
/// state. Primitives are transformed by the current transform and drawn in
/// the current color, then drawn on `flush`.
pub trait ShapeRenderer {
    fn push_color(&mut self, color: Color4u);
    fn pop_color(&mut self);
    fn push_transform(&mut self, transform: Mat4);
    fn pop_transform(&mut self);

    fn push_line(&mut self, from: Vec3, to: Vec3);
    fn push_aabb(&mut self, aabb: &Aabb);
    /// Red, green and blue axis lines along the columns of `basis`.
    fn push_basis(&mut self, basis: &Mat4, length: f32);

    fn flush(&mut self, view_projection: Mat4);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Color,
    Transform,
}

/// Pushed color or transform that is popped when the scope drops.
pub struct StateScope<'a, S: ShapeRenderer + ?Sized> {
    shapes: &'a mut S,
    kind: ScopeKind,
}

impl<S: ShapeRenderer + ?Sized> Deref for StateScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.shapes
    }
}

impl<S: ShapeRenderer + ?Sized> DerefMut for StateScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.shapes
    }
}

impl<S: ShapeRenderer + ?Sized> Drop for StateScope<'_, S> {
    fn drop(&mut self) {
        match self.kind {
            ScopeKind::Color => self.shapes.pop_color(),
            ScopeKind::Transform => self.shapes.pop_transform(),
        }
    }
}

/// Scoped pushes for any [`ShapeRenderer`].
pub trait ShapeRendererExt: ShapeRenderer {
    fn color_scope(&mut self, color: Color4u) -> StateScope<'_, Self> {
        self.push_color(color);
        StateScope {
            shapes: self,
            kind: ScopeKind::Color,
        }
    }

    fn transform_scope(&mut self, transform: Mat4) -> StateScope<'_, Self> {
        self.push_transform(transform);
        StateScope {
            shapes: self,
            kind: ScopeKind::Transform,
        }
    }
}

impl<S: ShapeRenderer + ?Sized> ShapeRendererExt for S {}

/// A world-space line with its resolved color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Color4u,
}

const AABB_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Headless [`ShapeRenderer`] that resolves every primitive to world-space
/// line segments and keeps the last flushed batch.
#[derive(Debug, Default)]
pub struct ShapeBatch {
    colors: Vec<Color4u>,
    transforms: Vec<Mat4>,
    pending: Vec<LineSegment>,
    flushed: Vec<LineSegment>,
    view_projection: Option<Mat4>,
    flushes: u64,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self) -> Color4u {
        self.colors.last().copied().unwrap_or(Color4u::WHITE)
    }

    pub fn transform(&self) -> Mat4 {
        self.transforms.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    /// Open color and transform pushes.
    pub fn depth(&self) -> (usize, usize) {
        (self.colors.len(), self.transforms.len())
    }

    pub fn pending(&self) -> &[LineSegment] {
        &self.pending
    }

    pub fn last_flush(&self) -> &[LineSegment] {
        &self.flushed
    }

    pub fn last_view_projection(&self) -> Option<Mat4> {
        self.view_projection
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    fn line(&mut self, from: Vec3, to: Vec3, color: Color4u) {
        let transform = self.transform();
        self.pending.push(LineSegment {
            from: transform.transform_point3(from),
            to: transform.transform_point3(to),
            color,
        });
    }
}

impl ShapeRenderer for ShapeBatch {
    fn push_color(&mut self, color: Color4u) {
        self.colors.push(color);
    }

    fn pop_color(&mut self) {
        if self.colors.pop().is_none() {
            tracing::warn!("pop_color on empty stack");
        }
    }

    fn push_transform(&mut self, transform: Mat4) {
        let combined = self.transform() * transform;
        self.transforms.push(combined);
    }

    fn pop_transform(&mut self) {
        if self.transforms.pop().is_none() {
            tracing::warn!("pop_transform on empty stack");
        }
    }

    fn push_line(&mut self, from: Vec3, to: Vec3) {
        self.line(from, to, self.color());
    }

    fn push_aabb(&mut self, aabb: &Aabb) {
        if aabb.is_empty() {
            return;
        }
        let corners = aabb.corners();
        let color = self.color();
        for (a, b) in AABB_EDGES {
            self.line(corners[a], corners[b], color);
        }
    }

    fn push_basis(&mut self, basis: &Mat4, length: f32) {
        let origin = basis.w_axis.truncate();
        let axes = [
            (basis.x_axis.truncate(), Color4u::RED),
            (basis.y_axis.truncate(), Color4u::GREEN),
            (basis.z_axis.truncate(), Color4u::BLUE),
        ];
        for (axis, color) in axes {
            self.line(origin, origin + axis * length, color);
        }
    }

    fn flush(&mut self, view_projection: Mat4) {
        let (colors, transforms) = self.depth();
        if colors + transforms > 0 {
            tracing::warn!(colors, transforms, "shape state left pushed at flush");
        }
        tracing::trace!(lines = self.pending.len(), "shape batch flushed");
        self.flushed = std::mem::take(&mut self.pending);
        self.view_projection = Some(view_projection);
        self.flushes += 1;
    }
}
