// ABOUTME: Validated domain types for units, images, and cluster resources.
// ABOUTME: Phantom-typed ids prevent mixing container and network identifiers.

mod id;
mod image_ref;
mod names;
mod unit_id;

pub use id::{ContainerId, NetworkId};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use names::{ServiceName, ServiceNameError, StackName, StackNameError};
pub use unit_id::{UnitId, UnitIdError};
