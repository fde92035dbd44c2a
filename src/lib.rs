pub mod branch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod grouping;
pub mod layout;
pub mod model;
pub mod persist;
pub mod routing;
pub mod template;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, GroupingConfig, LayoutConfig, RoutingConfig, load_config};
pub use model::{
    Edge, Node, NodeColor, NodeKind, NodePatch, Point, Rect, Sheet, Size, Workspace,
};
pub use routing::{CubicCurve, CurveDescriptor, Facing, QuadraticCurve, route};
