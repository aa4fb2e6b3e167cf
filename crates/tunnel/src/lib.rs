//! GPU-free core of the wormhole visual.
//!
//! - [`field`] is the CPU rendition of the colour field shader.
//! - [`animation`] advances shader time, the cyclic texture offset and the
//!   camera/mesh motion each frame, and applies scroll input.
//! - [`scene`] describes the camera, fog, lights and viewport.
//! - [`mesh`] builds the open-ended cylinder the field is painted on.
//! - [`wormhole`] ties scene and animation into one owning context.

pub mod animation;
pub mod clock;
pub mod field;
pub mod mesh;
pub mod scene;
pub mod wormhole;

pub use animation::{AnimationState, AnimationTunables, Animator, ScrollDirection};
pub use clock::{Clock, ClockReading, ManualClock, SystemClock};
pub use field::{render_grid, shade, trace, FieldTrace, FieldUniforms, SurfaceSample};
pub use mesh::{CylinderMesh, CylinderSpec, MeshVertex};
pub use scene::{
    check_linkage, FogParameters, LightDescriptor, LightKind, Linkage, MeshTransform,
    PerspectiveCamera, Scene, ShadingInputs, Viewport,
};
pub use wormhole::Wormhole;
