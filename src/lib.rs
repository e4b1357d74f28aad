//! Arena-backed search trees for Rust.
//!
//! This crate provides four independent engines behind one capability trait,
//! [`SearchTree`]:
//!
//! - [`RedBlackTree`] - a binary search tree balanced by node colors
//! - [`Tree234`] - a B-tree of order 4 that splits top-down and stores duplicates
//! - [`SplayTree`] - a self-adjusting tree that moves every accessed node to the root
//! - [`KdTree`] - a k-d tree over points, with [`nearest`](KdTree::nearest) and
//!   [`range`](KdTree::range) queries
//!
//! Nodes live in a per-tree arena and are named by [`NodeId`] handles. Handles are
//! generational: once a node is freed, its id resolves to `None` rather than to
//! whichever node reuses the slot. Read-only views ([`RbView`], [`Node234View`],
//! [`SplayView`], [`KdView`]) walk the structure for rendering or inspection.
//!
//! # Example
//!
//! ```
//! use search_forest::{AnyTree, EngineKind, ForestConfig, SearchTree};
//!
//! let mut tree = search_forest::RedBlackTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key);
//! }
//! assert_eq!(*tree.root_view().unwrap().key(), 20);
//!
//! // Engines can also be picked by name at runtime.
//! let kind: EngineKind = "2-3-4".parse()?;
//! let mut forest = AnyTree::<i32>::from_config(&ForestConfig::new(kind))?;
//! if let AnyTree::Tree234(tree) = &mut forest {
//!     SearchTree::insert(tree, 7)?;
//!     SearchTree::insert(tree, 7)?;
//! }
//! assert_eq!(forest.len(), 2);
//! # Ok::<(), search_forest::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **`serde`** - Serialize and deserialize [`EngineKind`], [`ForestConfig`], [`Color`]
//!   and [`Point`]
//!
//! # Logging
//!
//! Structural changes (rotations, splits, merges, splays) are reported through
//! [`tracing`](https://docs.rs/tracing) at `TRACE` level, root changes and rejected
//! input at `DEBUG`. The crate never installs a subscriber.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod config;
mod error;
mod kd;
mod raw;
mod red_black;
mod splay;
mod tree;
mod tree234;

pub use config::{AnyTree, EngineKind, ForestConfig};
pub use error::{Error, Result};
pub use kd::{Coordinate, KdTree, KdView, Point};
pub use raw::NodeId;
pub use red_black::{Color, RbView, RedBlackTree};
pub use splay::{SplayTree, SplayView};
pub use tree::{InsertOutcome, Removal, SearchTree};
pub use tree234::{Node234View, Tree234};
