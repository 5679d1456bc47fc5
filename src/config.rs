//! Compile-time limits for bounded-memory targets.
//!
//! Everything here trades flexibility for a fixed worst-case footprint:
//! traversals use a fixed-depth stack instead of recursion, the object
//! arena never grows past its cap, and the static slot table has a fixed
//! number of entries.

/// Maximum nesting depth of the object tree.
///
/// Bounds the parent-link walks (page lookup). Pre-order traversals
/// follow child/sibling links iteratively, so the depth cap is a
/// caller contract, not a stack-size limit.
pub const OBJ_DEPTH_MAX: usize = 64;

/// Capacity of the object arena, pages included.
///
/// Creating an object once the arena is full fails with
/// [`UiError::PoolExhausted`](crate::UiError::PoolExhausted).
pub const OBJ_POOL_SIZE: usize = 256;

/// Capacity of the static slot table (paint-order list).
///
/// Objects beyond this count are reported once per rebuild and simply not
/// rendered; earlier entries are never corrupted.
pub const OBJ_SLOT_SIZE: usize = 128;

/// Rows of padding applied above the dirty rectangle before rendering.
pub const DIRTY_PAD_TOP: i16 = 2;
/// Rows of padding applied below the dirty rectangle.
pub const DIRTY_PAD_BOTTOM: i16 = 3;
/// Columns of padding applied left of the dirty rectangle.
pub const DIRTY_PAD_LEFT: i16 = 2;
/// Extra columns added to the dirty width (left pad plus right slack).
pub const DIRTY_PAD_WIDTH: i16 = 5;
