//! # recallkit
//!
//! Memoization engines for expensive, repeatedly queried computations.
//!
//! ## Architecture
//! - **KeyedCache**: fixed-capacity LRU cache (AHash index + linked recency
//!   list) with predicate-driven bulk invalidation
//! - **AdjustingTree**: splay tree that moves every touched key to the root
//! - **MemoStore**: common lookup/store seam so callers can memoize over
//!   either engine
//!
//! Both engines are single-threaded: reads mutate internal structure, so
//! shared use needs one external lock per engine instance.

#![warn(missing_docs)]

mod error;
mod lru;
mod memo;
mod splay;
mod stats;

pub use error::{Error, Result};
pub use lru::{KeyedCache, DEFAULT_CAPACITY};
pub use memo::MemoStore;
pub use splay::AdjustingTree;
pub use stats::{CacheStats, TreeStats};
