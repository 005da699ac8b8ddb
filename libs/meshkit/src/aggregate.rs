//! # Bounds Aggregation
//!
//! Folds the bounds of many leaves (renderers or colliders) into one box,
//! expressed either in world space or in the frame of a chosen root.
//!
//! Leaves arrive as a flat slice; walking a hierarchy to collect them is
//! the caller's business.

use crate::bounds::Bounds;
use crate::error::GeometryError;
use crate::transform::Transform;
use config::constants::ALL_LAYERS;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Frame the aggregated bounds are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Space {
    /// The root's own frame.
    Local,
    #[default]
    World,
}

/// Which kind of leaf extent takes part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundsSource {
    #[default]
    Renderers,
    Colliders,
}

/// Principal axis of a capsule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }
}

/// Collider geometry in the leaf's frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { center: DVec3, size: DVec3 },
    Sphere { center: DVec3, radius: f64 },
    /// `height` is the full length along `axis`, caps included.
    Capsule { center: DVec3, radius: f64, height: f64, axis: Axis },
    /// Precomputed bounds of a mesh collider.
    Mesh { bounds: Bounds },
    /// A shape with no bounds conversion, named by `kind`.
    Unsupported { kind: String },
}

impl ColliderShape {
    /// Bounds of the shape in the leaf's frame.
    ///
    /// # Errors
    ///
    /// [`GeometryError::UnsupportedShape`] for [`ColliderShape::Unsupported`].
    pub fn local_bounds(&self) -> Result<Bounds, GeometryError> {
        match self {
            Self::Box { center, size } => Ok(Bounds::new(*center, *size)),
            Self::Sphere { center, radius } => Ok(Bounds::new(*center, DVec3::splat(2.0 * radius))),
            Self::Capsule {
                center,
                radius,
                height,
                axis,
            } => {
                let along = axis.unit();
                let size = along * *height + (DVec3::ONE - along) * (2.0 * radius);
                Ok(Bounds::new(*center, size))
            }
            Self::Mesh { bounds } => Ok(*bounds),
            Self::Unsupported { kind } => Err(GeometryError::unsupported(kind.clone())),
        }
    }
}

/// Geometry carried by a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeafExtent {
    /// Renderer bounds in the leaf's frame.
    Renderer(Bounds),
    Collider(ColliderShape),
}

impl LeafExtent {
    fn source(&self) -> BoundsSource {
        match self {
            Self::Renderer(_) => BoundsSource::Renderers,
            Self::Collider(_) => BoundsSource::Colliders,
        }
    }

    fn local_bounds(&self) -> Result<Bounds, GeometryError> {
        match self {
            Self::Renderer(bounds) => Ok(*bounds),
            Self::Collider(shape) => shape.local_bounds(),
        }
    }
}

/// One participant in an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedLeaf {
    pub extent: LeafExtent,
    /// Leaf-to-world transform.
    pub world: Transform,
    pub active: bool,
    /// Layer index, tested against the options' bitmask.
    pub layer: u8,
}

impl BoundedLeaf {
    /// An active renderer leaf on layer 0.
    pub fn renderer(bounds: Bounds, world: Transform) -> Self {
        Self {
            extent: LeafExtent::Renderer(bounds),
            world,
            active: true,
            layer: 0,
        }
    }

    /// An active collider leaf on layer 0.
    pub fn collider(shape: ColliderShape, world: Transform) -> Self {
        Self {
            extent: LeafExtent::Collider(shape),
            world,
            active: true,
            layer: 0,
        }
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn qualifies(&self, options: &AggregateOptions) -> bool {
        let on_layer = 1u32
            .checked_shl(u32::from(self.layer))
            .is_some_and(|bit| bit & options.layers != 0);
        self.extent.source() == options.source && on_layer && (self.active || options.include_disabled)
    }

    /// World-space bounds, `None` when the extent has no conversion.
    fn world_bounds(&self) -> Option<Bounds> {
        self.bounds_or_warn().map(|b| b.transformed(&self.world))
    }

    fn bounds_or_warn(&self) -> Option<Bounds> {
        match self.extent.local_bounds() {
            Ok(bounds) => Some(bounds),
            Err(err) => {
                warn!(%err, "skipping leaf without bounds");
                None
            }
        }
    }
}

/// The frame aggregation is centered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsRoot {
    /// Root-to-world transform.
    pub world: Transform,
    /// Root position relative to its own parent.
    pub local_position: DVec3,
}

/// Filters and frame for [`aggregate_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    pub space: Space,
    pub source: BoundsSource,
    /// Bitmask of accepted layers.
    pub layers: u32,
    pub include_disabled: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            space: Space::World,
            source: BoundsSource::Renderers,
            layers: ALL_LAYERS,
            include_disabled: false,
        }
    }
}

/// Unites the bounds of every qualifying leaf.
///
/// World space transforms each leaf box into world space. Local space maps
/// the leaf box's min, max and center points into the root frame and takes
/// their component-wise extremes. With no qualifying leaf the result is a
/// zero-size box at the root's position (`local_position` for
/// [`Space::Local`], world translation for [`Space::World`]).
///
/// # Example
///
/// ```rust
/// use meshkit::aggregate::{aggregate_bounds, AggregateOptions, BoundedLeaf, BoundsRoot};
/// use meshkit::{Bounds, Transform};
/// use glam::DVec3;
///
/// let unit = Bounds::new(DVec3::ZERO, DVec3::ONE);
/// let leaves = [
///     BoundedLeaf::renderer(unit, Transform::IDENTITY),
///     BoundedLeaf::renderer(unit, Transform::from_translation(DVec3::new(4.0, 0.0, 0.0))),
/// ];
/// let total = aggregate_bounds(&BoundsRoot::default(), &leaves, &AggregateOptions::default());
/// assert_eq!(total.min(), DVec3::splat(-0.5));
/// assert_eq!(total.max(), DVec3::new(4.5, 0.5, 0.5));
/// ```
pub fn aggregate_bounds(root: &BoundsRoot, leaves: &[BoundedLeaf], options: &AggregateOptions) -> Bounds {
    let mut total: Option<Bounds> = None;
    for leaf in leaves.iter().filter(|leaf| leaf.qualifies(options)) {
        let bounds = match options.space {
            Space::World => leaf.world_bounds(),
            Space::Local => leaf
                .bounds_or_warn()
                .and_then(|b| local_to_root(&b, &leaf.world, &root.world)),
        };
        if let Some(bounds) = bounds {
            total = Some(match total {
                Some(t) => t.encapsulate(&bounds),
                None => bounds,
            });
        }
    }

    total.unwrap_or_else(|| {
        let origin = match options.space {
            Space::Local => root.local_position,
            Space::World => root.world.translation,
        };
        Bounds::from_point(origin)
    })
}

fn local_to_root(bounds: &Bounds, leaf: &Transform, root: &Transform) -> Option<Bounds> {
    Bounds::from_points(
        [bounds.min(), bounds.max(), bounds.center()]
            .into_iter()
            .map(|p| leaf.point_to_space(p, root)),
    )
}

/// Indices of leaves of the given kind whose world bounds contain `point`.
///
/// Activity and layer are ignored; unsupported colliders never match.
pub fn leaves_containing_point(leaves: &[BoundedLeaf], point: DVec3, source: BoundsSource) -> Vec<usize> {
    leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| leaf.extent.source() == source)
        .filter(|(_, leaf)| leaf.world_bounds().is_some_and(|b| b.contains(point)))
        .map(|(i, _)| i)
        .collect()
}
