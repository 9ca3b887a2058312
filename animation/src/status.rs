/// The status of a timeline reported to the status observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationStatus {
  /// Stopped between the start and the end.
  Idle,
  /// Running toward the end.
  Forward,
  /// Running toward the start.
  Reverse,
  /// Stopped at the end.
  Completed,
  /// Stopped at the start.
  Dismissed,
  /// Stopped because the animation was abandoned, not because it reached a
  /// bound.
  Canceled,
}

/// Which bound the timeline is heading to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
  #[default]
  Forward,
  Reverse,
}

impl AnimationStatus {
  /// The status of a stopped timeline at `progress`.
  pub fn stopped_at(progress: f32) -> Self {
    if progress >= 1. {
      AnimationStatus::Completed
    } else if progress <= 0. {
      AnimationStatus::Dismissed
    } else {
      AnimationStatus::Idle
    }
  }

  #[inline]
  pub fn running(direction: Direction) -> Self {
    match direction {
      Direction::Forward => AnimationStatus::Forward,
      Direction::Reverse => AnimationStatus::Reverse,
    }
  }

  #[inline]
  pub fn is_completed(&self) -> bool { matches!(self, AnimationStatus::Completed) }
}

impl Direction {
  /// The progress this direction is heading to.
  #[inline]
  pub fn target(self) -> f32 {
    match self {
      Direction::Forward => 1.,
      Direction::Reverse => 0.,
    }
  }
}
