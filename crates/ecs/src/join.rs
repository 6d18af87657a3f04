//! Views over several component tables.
//!
//! A view is the intersection of tables: it yields only entities present in
//! every joined table. Both sides arrive in ascending `EntityId` order, so the
//! intersection is a lazy merge that never allocates. Calling the table
//! iterators again restarts the view.
//!
//! ```ignore
//! let t = store.tables_mut();
//! for (_, (tfm, vel)) in t.transforms.iter_mut().join(t.velocities.iter()) {
//!     tfm.position += vel.0 * dt;
//! }
//! ```

use scenekit_common::EntityId;
use std::iter::Peekable;

/// Sorted merge-intersection of two `(EntityId, _)` streams.
pub struct Join<L, R>
where
    R: Iterator,
{
    left: L,
    right: Peekable<R>,
}

impl<L, R> Join<L, R>
where
    R: Iterator,
{
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right: right.peekable(),
        }
    }
}

impl<L, R, A, B> Iterator for Join<L, R>
where
    L: Iterator<Item = (EntityId, A)>,
    R: Iterator<Item = (EntityId, B)>,
{
    type Item = (EntityId, (A, B));

    fn next(&mut self) -> Option<Self::Item> {
        'left: loop {
            let (id, a) = self.left.next()?;
            loop {
                let right_id = self.right.peek()?.0;
                if right_id < id {
                    self.right.next();
                } else if right_id == id {
                    let (_, b) = self.right.next()?;
                    return Some((id, (a, b)));
                } else {
                    continue 'left;
                }
            }
        }
    }
}

/// Adds `.join(other)` to any id-sorted component stream.
pub trait JoinExt: Iterator + Sized {
    fn join<R>(self, right: R) -> Join<Self, R::IntoIter>
    where
        R: IntoIterator,
    {
        Join::new(self, right.into_iter())
    }
}

impl<I: Iterator> JoinExt for I {}
