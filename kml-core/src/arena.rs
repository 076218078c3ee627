//! Allocation tracking for one parse attempt.
//!
//! Every node, attribute and coordinate the tree builder creates is
//! registered here first. An object leaves the arena in exactly one of two
//! ways:
//!
//! - **adopted** - [`Arena::unregister`] moves it out to its new owner (a
//!   node absorbing its attributes, or the finished document taking its
//!   nodes). The entry is cleared and never visited again.
//! - **released** - [`Arena::release_all`] drops whatever is still
//!   registered, exactly once, when the parse ends.
//!
//! # Layout
//!
//! ```text
//! Arena<T>
//! └── blocks: Vec<Block>      (chained, never reallocated once full)
//!     └── entries: [Option<T>; BLOCK_CAPACITY]
//! ```
//!
//! Handles are flat indices, so they stay valid while new blocks are chained.

use std::fmt;
use std::marker::PhantomData;

/// Entries per block.
pub const BLOCK_CAPACITY: usize = 1024;

/// Kind tag for tracked objects, used in accounting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Node,
    Attribute,
    Coordinate,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Node => f.write_str("node"),
            EntryKind::Attribute => f.write_str("attribute"),
            EntryKind::Coordinate => f.write_str("coordinate"),
        }
    }
}

/// Types that can live in an [`Arena`].
pub trait Tracked {
    const KIND: EntryKind;
}

/// What a final sweep means for the entries it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Failure path: everything still registered is transient garbage.
    Discard,
    /// Success path: anything still registered was never adopted.
    Orphans,
}

/// Index of an entry in an [`Arena<T>`].
///
/// 4 bytes. Only meaningful for the arena that issued it.
pub struct Handle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Handle {
            index: index as u32,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    fn block(self) -> usize {
        self.index() / BLOCK_CAPACITY
    }

    #[inline]
    fn slot(self) -> usize {
        self.index() % BLOCK_CAPACITY
    }
}

// Manual impls: derives would put bounds on `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: Tracked> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", T::KIND, self.index)
    }
}

/// Accounting for one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub kind: EntryKind,
    pub registered: usize,
    pub adopted: usize,
    pub discarded: usize,
    pub orphaned: usize,
}

impl ArenaStats {
    pub(crate) fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            registered: 0,
            adopted: 0,
            discarded: 0,
            orphaned: 0,
        }
    }

    /// Entries neither adopted nor released yet.
    pub fn outstanding(&self) -> usize {
        self.registered - self.adopted - self.discarded - self.orphaned
    }

    /// True once every registered entry has been accounted for exactly once.
    pub fn is_balanced(&self) -> bool {
        self.outstanding() == 0
    }

    /// Fold another arena's accounting of the same kind into this one.
    pub fn merge(&mut self, other: &ArenaStats) {
        debug_assert_eq!(self.kind, other.kind);
        self.registered += other.registered;
        self.adopted += other.adopted;
        self.discarded += other.discarded;
        self.orphaned += other.orphaned;
    }
}

struct Block<T> {
    entries: Vec<Option<T>>,
}

impl<T> Block<T> {
    fn new() -> Self {
        Block {
            entries: Vec::with_capacity(BLOCK_CAPACITY),
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.entries.len() == BLOCK_CAPACITY
    }
}

/// Block-chained store of tracked objects.
pub struct Arena<T: Tracked> {
    blocks: Vec<Block<T>>,
    stats: ArenaStats,
}

impl<T: Tracked> Arena<T> {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            stats: ArenaStats::new(T::KIND),
        }
    }

    /// Track a new object, chaining a block when the current one is full.
    pub fn register(&mut self, value: T) -> Handle<T> {
        if self.blocks.last().map_or(true, Block::is_full) {
            self.blocks.push(Block::new());
        }
        let index = self.stats.registered;
        // Just ensured a non-full last block.
        if let Some(block) = self.blocks.last_mut() {
            block.entries.push(Some(value));
        }
        self.stats.registered += 1;
        Handle::new(index)
    }

    /// Clear the entry and hand the object to the caller.
    ///
    /// Returns `None` if the handle was already adopted.
    pub fn unregister(&mut self, handle: Handle<T>) -> Option<T> {
        let value = self
            .blocks
            .get_mut(handle.block())?
            .entries
            .get_mut(handle.slot())?
            .take()?;
        self.stats.adopted += 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.blocks
            .get(handle.block())?
            .entries
            .get(handle.slot())?
            .as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.blocks
            .get_mut(handle.block())?
            .entries
            .get_mut(handle.slot())?
            .as_mut()
    }

    /// Number of entries still registered.
    pub fn live(&self) -> usize {
        self.stats.outstanding()
    }

    /// Number of blocks in the chain.
    pub fn blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// Iterate live entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.blocks
            .iter()
            .flat_map(|block| block.entries.iter())
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|value| (Handle::new(index), value)))
    }

    /// Drop every still-registered entry and the block chain itself.
    pub fn release_all(mut self, policy: ReleasePolicy) -> ArenaStats {
        let mut released = 0;
        for block in self.blocks.drain(..) {
            released += block.entries.into_iter().flatten().count();
        }
        match policy {
            ReleasePolicy::Discard => self.stats.discarded += released,
            ReleasePolicy::Orphans => {
                if released > 0 {
                    tracing::debug!(kind = %T::KIND, released, "releasing orphaned entries");
                }
                self.stats.orphaned += released;
            }
        }
        self.stats
    }
}

impl<T: Tracked> std::ops::Index<Handle<T>> for Arena<T> {
    type Output = T;

    /// Panics if the entry was adopted.
    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("{} {} is not registered", T::KIND, handle.index),
        }
    }
}

impl<T: Tracked> std::ops::IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("{} {} is not registered", T::KIND, handle.index),
        }
    }
}

impl<T: Tracked> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tracked> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("kind", &T::KIND)
            .field("blocks", &self.blocks.len())
            .field("live", &self.live())
            .finish()
    }
}
