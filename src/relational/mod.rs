//! # Relational Primitives
//!
//! Small, generic building blocks that every analysis stage is composed
//! from. They operate on in-memory row slices and borrow rather than copy
//! wherever the row type allows it.
//!
//! - [`join`] - hash-based inner, left and cross joins
//! - [`aggregate`] - group-by with pluggable reducers, sequential or parallel
//! - [`window`] - partitioned row numbering and top-N selection
//!
//! All outputs are deterministic for a fixed input ordering: grouped results
//! come back in key order and ranking uses a stable sort.

pub mod aggregate;
pub mod join;
pub mod window;

pub use aggregate::{group_aggregate, par_group_aggregate, Average, Count, Distinct, Max, Reducer, Sum};
pub use join::{cross_join, cross_join_filter_map, inner_join, left_join};
pub use window::{rank_within, top_n, top_n_within, Ranked, SortOrder};
