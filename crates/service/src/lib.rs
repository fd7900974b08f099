//! Service layer for playlists.
//! - Separates business rules (validation, uid assignment, item ordering) from data access.
//! - Reuses entity definitions and field validators from the `models` crate.
//! - Every operation is bounded by a cancellable [`playlist::RequestContext`].

pub mod playlist;
#[cfg(test)]
pub mod test_support;
