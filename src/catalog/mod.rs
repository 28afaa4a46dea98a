//! The seat-plane data model: [`Theatre`], [`Movie`], and the root [`Catalog`].
//!
//! Shape is fixed at load time — the key sets of `Catalog` and each `Movie` never
//! change after [`Catalog::load`] returns. Only the contents of a [`Theatre`]
//! (`free` / `owned`) mutate, always under the owning movie's lock.

mod catalog;
mod movie;
mod theatre;

pub use catalog::Catalog;
pub use movie::Movie;
pub use theatre::Theatre;

/// Per-theatre seat capacity. Seat indices are valid in `0..MAX_SEATS`.
pub const MAX_SEATS: u32 = 20;
