use crate::{easing::Easing, lerp::Lerp};

/// The value range an animation travels, from `begin` at progress `0` to
/// `end` at progress `1`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Tween<T> {
  pub begin: T,
  pub end: T,
}

impl<T: Lerp> Tween<T> {
  #[inline]
  pub fn new(begin: T, end: T) -> Self { Self { begin, end } }

  /// The value at `progress` without any easing.
  #[inline]
  pub fn lerp(&self, progress: f32) -> T { self.begin.lerp(&self.end, progress) }

  /// The value at `progress` after the `easing` curve mapped it.
  #[inline]
  pub fn transform(&self, progress: f32, easing: &dyn Easing) -> T {
    self.lerp(easing.easing(progress))
  }
}

impl<T: Lerp> From<(T, T)> for Tween<T> {
  #[inline]
  fn from((begin, end): (T, T)) -> Self { Self::new(begin, end) }
}

impl<T: Lerp> From<std::ops::Range<T>> for Tween<T> {
  #[inline]
  fn from(range: std::ops::Range<T>) -> Self { Self::new(range.start, range.end) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::easing::{EASE_IN, LINEAR};

  #[test]
  fn transform_through_curve() {
    let tween = Tween::new(0., 100.);
    assert_eq!(tween.transform(0.5, &LINEAR), 50.);
    assert!(tween.transform(0.5, &EASE_IN) < 50.);
    assert_eq!(tween.transform(1., &EASE_IN), 100.);
  }

  #[test]
  fn from_range() {
    let tween: Tween<i32> = (10..20).into();
    assert_eq!(tween.lerp(0.5), 15);
    assert_eq!(tween.lerp(1.), 20);
  }
}
