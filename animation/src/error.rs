/// The animation description is not usable, reported when the spec is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("Required field `duration` not set")]
  MissingDuration,
  #[error("Required field `range` not set")]
  MissingRange,
  #[error("One of `render` or `render_with_child` must be set")]
  MissingRender,
  #[error("Only one of `render` or `render_with_child` can be set")]
  ConflictingRender,
  #[error("`render_with_child` requires a `child`")]
  MissingChild,
  #[error("`child` is only used by `render_with_child`")]
  UnusedChild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
  #[error(transparent)]
  Config(#[from] ConfigError),
  /// The spec reached render time without a render strategy, the timeline is
  /// canceled.
  #[error("No render strategy available at render time, the animation is canceled")]
  RenderDispatch,
}
