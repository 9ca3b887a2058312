//! Declarative tween playback on top of a stateful timeline.
//!
//! Describe an animation with an [`AnimationSpec`](animation_spec::AnimationSpec),
//! mount it on a [`PlaybackReconciler`](reconciler::PlaybackReconciler) and
//! keep supplying specs, the reconciler turns every [`PlaybackMode`] into the
//! timeline operation it stands for.

pub mod animation_spec;
pub mod easing;
pub mod error;
pub mod host;
pub mod lerp;
pub mod playback_mode;
pub mod reconciler;
pub mod status;
pub mod ticker;
pub mod timeline;
pub mod tween;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helper;

pub mod prelude {
  pub use crate::{
    animation_spec::{AnimationSpec, AnimationSpecBuilder, PlaybackSettings, Render},
    easing::{self, Easing},
    error::{AnimationError, ConfigError},
    host::{AnimationHost, FrameHost, PendingTask, TaskHandle},
    lerp::Lerp,
    playback_mode::PlaybackMode,
    reconciler::{LifecycleState, PlaybackReconciler},
    status::{AnimationStatus, Direction},
    ticker::{FrameMsg, FrameTicker},
    timeline::Timeline,
    tween::Tween,
  };
}
