//! Choosing an engine at runtime.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use tracing::debug;

use crate::{Error, KdTree, NodeId, RedBlackTree, Result, SplayTree, Tree234};

/// The four tree engines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineKind {
    /// [`RedBlackTree`], written `red-black`.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "red-black", alias = "redblack", alias = "rb"))]
    RedBlack,
    /// [`Tree234`], written `2-3-4`.
    #[cfg_attr(feature = "serde", serde(rename = "2-3-4", alias = "234"))]
    Tree234,
    /// [`SplayTree`], written `splay`.
    #[cfg_attr(feature = "serde", serde(rename = "splay"))]
    Splay,
    /// [`KdTree`], written `kd`.
    #[cfg_attr(feature = "serde", serde(rename = "kd", alias = "kdtree", alias = "k-d"))]
    KdTree,
}

impl EngineKind {
    /// Every engine, in a stable order.
    pub const ALL: [EngineKind; 4] = [EngineKind::RedBlack, EngineKind::Tree234, EngineKind::Splay, EngineKind::KdTree];

    /// The canonical name, as accepted by [`FromStr`] and printed by [`Display`](fmt::Display).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EngineKind::RedBlack => "red-black",
            EngineKind::Tree234 => "2-3-4",
            EngineKind::Splay => "splay",
            EngineKind::KdTree => "kd",
        }
    }

    /// Returns `true` for the engine keyed by points rather than scalar keys.
    #[must_use]
    pub const fn is_spatial(self) -> bool {
        matches!(self, EngineKind::KdTree)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    /// Parses an engine name, ignoring ASCII case and surrounding whitespace.
    ///
    /// ```
    /// use search_forest::EngineKind;
    ///
    /// assert_eq!("Red-Black".parse(), Ok(EngineKind::RedBlack));
    /// assert_eq!(" 234 ".parse(), Ok(EngineKind::Tree234));
    /// assert!("avl".parse::<EngineKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        const NAMES: [(&str, EngineKind); 9] = [
            ("red-black", EngineKind::RedBlack),
            ("redblack", EngineKind::RedBlack),
            ("rb", EngineKind::RedBlack),
            ("2-3-4", EngineKind::Tree234),
            ("234", EngineKind::Tree234),
            ("splay", EngineKind::Splay),
            ("kd", EngineKind::KdTree),
            ("kdtree", EngineKind::KdTree),
            ("k-d", EngineKind::KdTree),
        ];

        let name = s.trim();
        NAMES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|&(_, kind)| kind)
            .ok_or_else(|| {
                debug!(name, "unknown engine");
                Error::UnknownEngine(name.to_string())
            })
    }
}

/// Which engine to build, and with how many dimensions if it is spatial.
///
/// # Examples
///
/// ```
/// use search_forest::{EngineKind, ForestConfig};
///
/// let config = ForestConfig::new(EngineKind::KdTree).with_dimensions(3);
/// assert_eq!(config.dimensions, 3);
/// assert_eq!(ForestConfig::default().engine, EngineKind::RedBlack);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForestConfig {
    /// The engine to build.
    pub engine: EngineKind,
    /// Point dimensionality for [`EngineKind::KdTree`]; ignored otherwise.
    pub dimensions: usize,
}

impl ForestConfig {
    /// A configuration for `engine` with two dimensions.
    #[must_use]
    pub const fn new(engine: EngineKind) -> Self {
        Self { engine, dimensions: 2 }
    }

    /// Sets the point dimensionality.
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::new(EngineKind::default())
    }
}

impl From<EngineKind> for ForestConfig {
    fn from(engine: EngineKind) -> Self {
        Self::new(engine)
    }
}

/// Exactly one engine, chosen at runtime.
///
/// The scalar engines are keyed by `K`; the k-d tree stores points with
/// coordinates of type `T`. Switching engines means building a new `AnyTree`.
///
/// # Examples
///
/// ```
/// use search_forest::{AnyTree, EngineKind, ForestConfig};
///
/// let mut tree = AnyTree::<i32, i32>::from_config(&ForestConfig::new(EngineKind::Splay))?;
/// if let AnyTree::Splay(splay) = &mut tree {
///     splay.insert(4);
///     splay.insert(2);
/// }
/// assert_eq!(tree.kind(), EngineKind::Splay);
/// assert_eq!(tree.len(), 2);
///
/// tree.clear();
/// assert!(tree.is_empty());
/// # Ok::<(), search_forest::Error>(())
/// ```
pub enum AnyTree<K, T = K> {
    /// A [`RedBlackTree`].
    RedBlack(RedBlackTree<K>),
    /// A [`Tree234`].
    Tree234(Tree234<K>),
    /// A [`SplayTree`].
    Splay(SplayTree<K>),
    /// A [`KdTree`].
    KdTree(KdTree<T>),
}

impl<K, T> AnyTree<K, T> {
    /// Builds a fresh, empty engine.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroDimensions`] for a k-d tree configured with zero dimensions.
    pub fn from_config(config: &ForestConfig) -> Result<Self> {
        debug!(engine = %config.engine, dimensions = config.dimensions, "building engine");
        Ok(match config.engine {
            EngineKind::RedBlack => AnyTree::RedBlack(RedBlackTree::new()),
            EngineKind::Tree234 => AnyTree::Tree234(Tree234::new()),
            EngineKind::Splay => AnyTree::Splay(SplayTree::new()),
            EngineKind::KdTree => AnyTree::KdTree(KdTree::with_dimensions(config.dimensions)?),
        })
    }

    /// Which engine this is.
    #[must_use]
    pub const fn kind(&self) -> EngineKind {
        match self {
            AnyTree::RedBlack(_) => EngineKind::RedBlack,
            AnyTree::Tree234(_) => EngineKind::Tree234,
            AnyTree::Splay(_) => EngineKind::Splay,
            AnyTree::KdTree(_) => EngineKind::KdTree,
        }
    }

    /// Number of keys or points stored.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            AnyTree::RedBlack(tree) => tree.len(),
            AnyTree::Tree234(tree) => tree.len(),
            AnyTree::Splay(tree) => tree.len(),
            AnyTree::KdTree(tree) => tree.len(),
        }
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the active engine.
    pub fn clear(&mut self) {
        match self {
            AnyTree::RedBlack(tree) => tree.clear(),
            AnyTree::Tree234(tree) => tree.clear(),
            AnyTree::Splay(tree) => tree.clear(),
            AnyTree::KdTree(tree) => tree.clear(),
        }
    }

    /// Id of the active engine's root.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        match self {
            AnyTree::RedBlack(tree) => tree.root(),
            AnyTree::Tree234(tree) => tree.root(),
            AnyTree::Splay(tree) => tree.root(),
            AnyTree::KdTree(tree) => tree.root(),
        }
    }

    /// Height of the active engine, in levels.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            AnyTree::RedBlack(tree) => tree.height(),
            AnyTree::Tree234(tree) => tree.height(),
            AnyTree::Splay(tree) => tree.height(),
            AnyTree::KdTree(tree) => tree.height(),
        }
    }
}

impl<K, T> fmt::Debug for AnyTree<K, T>
where
    K: fmt::Debug,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyTree::RedBlack(tree) => f.debug_tuple("RedBlack").field(tree).finish(),
            AnyTree::Tree234(tree) => f.debug_tuple("Tree234").field(tree).finish(),
            AnyTree::Splay(tree) => f.debug_tuple("Splay").field(tree).finish(),
            AnyTree::KdTree(tree) => f.debug_tuple("KdTree").field(tree).finish(),
        }
    }
}

impl<K, T> Default for AnyTree<K, T> {
    fn default() -> Self {
        AnyTree::RedBlack(RedBlackTree::new())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.name().parse::<EngineKind>(), Ok(kind));
            assert_eq!(alloc::format!("{kind}"), kind.name());
        }
        assert_eq!("KDTREE".parse(), Ok(EngineKind::KdTree));
        assert_eq!("b-tree".parse::<EngineKind>(), Err(Error::UnknownEngine("b-tree".into())));
    }

    #[test]
    fn zero_dimensional_kd_is_rejected() {
        let config = ForestConfig::new(EngineKind::KdTree).with_dimensions(0);
        assert!(matches!(AnyTree::<i32>::from_config(&config), Err(Error::ZeroDimensions)));
        // Dimensions do not matter to the scalar engines.
        let config = ForestConfig::new(EngineKind::Tree234).with_dimensions(0);
        assert_eq!(AnyTree::<i32>::from_config(&config).unwrap().kind(), EngineKind::Tree234);
    }

    #[test]
    fn every_engine_builds_empty() {
        for kind in EngineKind::ALL {
            let tree = AnyTree::<u8, f64>::from_config(&kind.into()).unwrap();
            assert_eq!(tree.kind(), kind);
            assert!(tree.is_empty());
            assert_eq!(tree.root(), None);
            assert_eq!(tree.height(), 0);
        }
    }
}
