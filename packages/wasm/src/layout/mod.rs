//! Family tree layout.
//!
//! [`build_forest`] turns flat people and parent → child edges into an ordered
//! forest; [`PedigreeLayout`] assigns every person a box position and every
//! drawable edge a [`Connector`].

pub mod connector;
pub mod forest;
pub mod pedigree;

pub use connector::Connector;
pub use forest::{build_forest, Forest, ForestTree, TreeNode, TreeOrigin};
pub use pedigree::{
    compute_forest_layout, ForestLayout, NodePlacement, PedigreeLayout, PedigreeLayoutConfig,
};
