//! The declarative description of an animation.
//!
//! An [`AnimationSpec`] is plain data: the range to animate, the curve, the
//! timing and the playback mode, plus how to turn the animated value into a
//! view. Build it with [`AnimationSpec::builder`]:
//!
//! ```
//! use std::time::Duration;
//!
//! use tween_playback::prelude::*;
//!
//! let spec = AnimationSpec::<f32, String>::builder()
//!   .range(0. ..100.)
//!   .duration(Duration::from_millis(300))
//!   .curve(easing::EASE_IN_OUT)
//!   .mode(PlaybackMode::Mirror)
//!   .render(|v| format!("{v:.1}"))
//!   .build()
//!   .unwrap();
//!
//! assert_eq!(spec.mode(), PlaybackMode::Mirror);
//! ```

use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::{
  easing::{Easing, LINEAR},
  error::{AnimationError, ConfigError},
  lerp::Lerp,
  playback_mode::PlaybackMode,
  status::AnimationStatus,
  tween::Tween,
};

/// A callback shared between the spec and the reconciler, so it can be called
/// without holding the reconciler state.
pub type SharedCallback<E> = Rc<RefCell<dyn FnMut(E)>>;

/// How the animated value is turned into a view.
pub enum Render<T, V> {
  /// Build the view from the value only.
  Value(Box<dyn FnMut(T) -> V>),
  /// Build the view from a fixed child and the value.
  WithChild { child: V, render: Box<dyn FnMut(&V, T) -> V> },
}

/// The plain data part of an animation, suitable to be kept in configuration
/// files.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PlaybackSettings {
  pub mode: PlaybackMode,
  pub duration: Option<Duration>,
  pub delay: Option<Duration>,
  pub start_position: f32,
  pub fps: Option<u32>,
}

pub struct AnimationSpec<T, V> {
  range: Tween<T>,
  curve: Box<dyn Easing>,
  duration: Duration,
  delay: Option<Duration>,
  mode: PlaybackMode,
  start_position: f32,
  fps: Option<u32>,
  render: Option<Render<T, V>>,
  pub(crate) status_observer: Option<SharedCallback<AnimationStatus>>,
  pub(crate) on_started: Option<SharedCallback<()>>,
  pub(crate) on_completed: Option<SharedCallback<()>>,
}

pub struct AnimationSpecBuilder<T, V> {
  range: Option<Tween<T>>,
  curve: Option<Box<dyn Easing>>,
  duration: Option<Duration>,
  delay: Option<Duration>,
  mode: PlaybackMode,
  start_position: f32,
  fps: Option<u32>,
  render: Option<Box<dyn FnMut(T) -> V>>,
  render_with_child: Option<Box<dyn FnMut(&V, T) -> V>>,
  child: Option<V>,
  status_observer: Option<SharedCallback<AnimationStatus>>,
  on_started: Option<SharedCallback<()>>,
  on_completed: Option<SharedCallback<()>>,
}

impl<T, V> AnimationSpec<T, V> {
  #[inline]
  pub fn builder() -> AnimationSpecBuilder<T, V> { AnimationSpecBuilder::default() }

  #[inline]
  pub fn range(&self) -> &Tween<T> { &self.range }

  #[inline]
  pub fn duration(&self) -> Duration { self.duration }

  #[inline]
  pub fn delay(&self) -> Option<Duration> { self.delay }

  #[inline]
  pub fn mode(&self) -> PlaybackMode { self.mode }

  #[inline]
  pub fn start_position(&self) -> f32 { self.start_position }

  #[inline]
  pub fn fps(&self) -> Option<u32> { self.fps }

  pub fn settings(&self) -> PlaybackSettings {
    PlaybackSettings {
      mode: self.mode,
      duration: Some(self.duration),
      delay: self.delay,
      start_position: self.start_position,
      fps: self.fps,
    }
  }

  /// The shortest time between two renders while the animation is running.
  pub(crate) fn frame_interval(&self) -> Option<Duration> {
    self
      .fps
      .filter(|fps| *fps > 0)
      .map(|fps| Duration::from_secs_f64(1. / fps as f64))
  }

  /// Build the view by the render strategy of the spec.
  pub(crate) fn dispatch_render(&mut self, value: T) -> Result<V, AnimationError> {
    match self.render.as_mut() {
      Some(Render::Value(render)) => Ok(render(value)),
      Some(Render::WithChild { child, render }) => Ok(render(child, value)),
      None => Err(AnimationError::RenderDispatch),
    }
  }
}

impl<T: Lerp, V> AnimationSpec<T, V> {
  /// The interpolated value at `progress`, the curve applied.
  #[inline]
  pub fn value_at(&self, progress: f32) -> T { self.range.transform(progress, &*self.curve) }
}

impl<T, V> Default for AnimationSpecBuilder<T, V> {
  fn default() -> Self {
    Self {
      range: None,
      curve: None,
      duration: None,
      delay: None,
      mode: PlaybackMode::default(),
      start_position: 0.,
      fps: None,
      render: None,
      render_with_child: None,
      child: None,
      status_observer: None,
      on_started: None,
      on_completed: None,
    }
  }
}

impl<T, V> AnimationSpecBuilder<T, V> {
  /// The value range, required.
  pub fn range(mut self, range: impl Into<Tween<T>>) -> Self {
    self.range = Some(range.into());
    self
  }

  /// The easing curve, linear if not set.
  pub fn curve(mut self, curve: impl Easing + 'static) -> Self {
    self.curve = Some(Box::new(curve));
    self
  }

  /// How long the animation travels the whole range, required.
  pub fn duration(mut self, duration: Duration) -> Self {
    self.duration = Some(duration);
    self
  }

  /// How long to wait after mounted before the first instruction.
  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn mode(mut self, mode: PlaybackMode) -> Self {
    self.mode = mode;
    self
  }

  /// The progress of the timeline when mounted, clamped to `[0, 1]`.
  pub fn start_position(mut self, progress: f32) -> Self {
    self.start_position = progress.clamp(0., 1.);
    self
  }

  /// Limit how often the view is rebuilt while running.
  pub fn fps(mut self, fps: u32) -> Self {
    self.fps = Some(fps);
    self
  }

  /// Apply every field of `settings`, `duration` is kept if the settings not
  /// provide one.
  pub fn settings(mut self, settings: PlaybackSettings) -> Self {
    let PlaybackSettings { mode, duration, delay, start_position, fps } = settings;
    self.mode = mode;
    self.duration = duration.or(self.duration);
    self.delay = delay;
    self.start_position = start_position.clamp(0., 1.);
    self.fps = fps;
    self
  }

  pub fn render(mut self, render: impl FnMut(T) -> V + 'static) -> Self {
    self.render = Some(Box::new(render));
    self
  }

  pub fn render_with_child(mut self, render: impl FnMut(&V, T) -> V + 'static) -> Self {
    self.render_with_child = Some(Box::new(render));
    self
  }

  pub fn child(mut self, child: V) -> Self {
    self.child = Some(child);
    self
  }

  /// Observe every status change of the timeline.
  pub fn status_observer(mut self, observer: impl FnMut(AnimationStatus) + 'static) -> Self {
    self.status_observer = Some(Rc::new(RefCell::new(observer)));
    self
  }

  /// Called once the animation starts, after the delay if any.
  pub fn on_started(mut self, mut f: impl FnMut() + 'static) -> Self {
    self.on_started = Some(Rc::new(RefCell::new(move |_: ()| f())));
    self
  }

  /// Called every time the timeline completes at the end.
  pub fn on_completed(mut self, mut f: impl FnMut() + 'static) -> Self {
    self.on_completed = Some(Rc::new(RefCell::new(move |_: ()| f())));
    self
  }

  pub fn build(self) -> Result<AnimationSpec<T, V>, ConfigError> {
    if let Some(err) = self.missing_required() {
      return Err(err);
    }
    let has_render = self.render.is_some();
    let has_child_render = self.render_with_child.is_some();
    match (has_render, has_child_render, self.child.is_some()) {
      (true, true, _) => Err(ConfigError::ConflictingRender),
      (false, false, _) => Err(ConfigError::MissingRender),
      (false, true, false) => Err(ConfigError::MissingChild),
      (true, false, true) => Err(ConfigError::UnusedChild),
      _ => self.build_unchecked(),
    }
  }

  /// Build without the render strategy check. The spec may end up without a
  /// render strategy, rendering it fails with `AnimationError::RenderDispatch`.
  pub fn build_unchecked(self) -> Result<AnimationSpec<T, V>, ConfigError> {
    let Self {
      range,
      curve,
      duration,
      delay,
      mode,
      start_position,
      fps,
      render,
      render_with_child,
      child,
      status_observer,
      on_started,
      on_completed,
    } = self;
    let Some(duration) = duration else { return Err(ConfigError::MissingDuration) };
    let Some(range) = range else { return Err(ConfigError::MissingRange) };

    let render = match (render, render_with_child, child) {
      (Some(render), _, _) => Some(Render::Value(render)),
      (None, Some(render), Some(child)) => Some(Render::WithChild { child, render }),
      _ => None,
    };

    Ok(AnimationSpec {
      range,
      curve: curve.unwrap_or_else(|| Box::new(LINEAR)),
      duration,
      delay,
      mode,
      start_position,
      fps,
      render,
      status_observer,
      on_started,
      on_completed,
    })
  }

  fn missing_required(&self) -> Option<ConfigError> {
    if self.duration.is_none() {
      Some(ConfigError::MissingDuration)
    } else if self.range.is_none() {
      Some(ConfigError::MissingRange)
    } else {
      None
    }
  }
}
