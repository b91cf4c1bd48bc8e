//! # recallsvc
//!
//! Domain services memoized by the `recallkit` engines.
//!
//! - **RangeSumService**: inclusive range sums over a mutable array, cached
//!   by `(left, right)` with update-driven invalidation
//! - **MemoFibService**: Fibonacci numbers memoized in any `MemoStore`
//!   (splay tree or LRU cache)

#![warn(missing_docs)]

mod fib;
mod range_sum;

pub use fib::{fib_iterative, memo_fib, MemoFibService};
pub use range_sum::{RangeKey, RangeSumService};
