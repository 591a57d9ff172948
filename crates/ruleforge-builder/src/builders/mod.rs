//! Builders that compile definition JSON into expression trees.

pub mod asset;
pub mod operation;
pub mod stage;

pub use asset::{AssetKind, CompiledAsset, build_asset};
pub use operation::{OperationMode, build_operation};
pub use stage::{build_check_stage, build_map_stage, build_normalize_stage};
