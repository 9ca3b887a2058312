use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment};

/// Specify the rate of change of the rate of over time.
pub trait Easing {
  fn easing(&self, time_rate: f32) -> f32;
}

/// Animate at a Cubic Bézier curve. Limit x value between [0., 1.], so x-axis
/// same as time rate (t == x ), y-axis use as for the rate of change.
///
/// Construct `CubicBezierEasing` with two control pointer, the curve always
/// start from (0., 0.) to (1., 1.).
#[derive(Clone, Debug, PartialEq)]
pub struct CubicBezierEasing(CubicBezierSegment<f32>);

/// Animate at a Quadratic Bézier curve. Limit x value between [0., 1.], so
/// x-axis same as time rate (t == x ), y-axis use as for the rate of change.
///
/// Construct `QuadraticBezierEasing` with one control pointer, the curve
/// always start from (0., 0.) to (1., 1.).
#[derive(Clone, Debug, PartialEq)]
pub struct QuadraticBezierEasing(QuadraticBezierSegment<f32>);

/// Animates at an even speed
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LinearEasing;

/// Jump from the start value to the end value once the time rate pass the
/// threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepEasing(pub f32);

// Some const easing cubic bezier provide.
// reference: https://developer.mozilla.org/en-US/docs/Web/CSS/animation-timing-function

/// Increases in velocity towards the middle of the animation, slowing back down
/// at the end.
pub const EASE: CubicBezierEasing = CubicBezierEasing::new(0.25, 0.1, 0.25, 1.0);

///  Animates at an even speed
pub const LINEAR: LinearEasing = LinearEasing;

/// Starts off slowly, with the speed of the transition of the animating
/// property increasing until complete.
pub const EASE_IN: CubicBezierEasing = CubicBezierEasing::new(0.42, 0., 1., 1.);

/// Starts quickly, slowing down the animation continues.
pub const EASE_OUT: CubicBezierEasing = CubicBezierEasing::new(0., 0., 0.58, 1.);

/// With the animating properties slowly transitioning, speeding up, and then
/// slowing down again.
pub const EASE_IN_OUT: CubicBezierEasing = CubicBezierEasing::new(0.42, 0., 0.58, 1.);

impl CubicBezierEasing {
  /// Construct cubic bezier by two control point, the values of `x1` and `x2`
  /// should be in the range of 0 to 1 to keep the curve a function of time.
  pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
    use lyon_geom::Point as LPoint;
    Self(CubicBezierSegment {
      from: LPoint::new(0., 0.),
      ctrl1: LPoint::new(x1, y1),
      ctrl2: LPoint::new(x2, y2),
      to: LPoint::new(1., 1.),
    })
  }
}

impl QuadraticBezierEasing {
  pub const fn new(x: f32, y: f32) -> Self {
    use lyon_geom::Point as LPoint;
    Self(QuadraticBezierSegment {
      from: LPoint::new(0., 0.),
      ctrl: LPoint::new(x, y),
      to: LPoint::new(1., 1.),
    })
  }
}

impl Easing for LinearEasing {
  #[inline]
  fn easing(&self, time_rate: f32) -> f32 { time_rate }
}

impl Easing for QuadraticBezierEasing {
  #[inline]
  fn easing(&self, time_rate: f32) -> f32 { self.0.y(time_rate.clamp(0., 1.)) }
}

impl Easing for CubicBezierEasing {
  fn easing(&self, time_rate: f32) -> f32 {
    if time_rate <= 0. || time_rate >= 1. {
      return time_rate.clamp(0., 1.);
    }
    let ts = self.0.solve_t_for_x(time_rate);
    // Precision loss may leave no root, the time rate is the best guess then.
    let t = ts.first().copied().unwrap_or(time_rate);
    self.0.y(t)
  }
}

impl Easing for StepEasing {
  #[inline]
  fn easing(&self, time_rate: f32) -> f32 { if time_rate < self.0 { 0. } else { 1. } }
}

impl<F: Fn(f32) -> f32> Easing for F {
  #[inline]
  fn easing(&self, time_rate: f32) -> f32 { self(time_rate) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-3 }

  #[test]
  fn curves_keep_end_points() {
    let step = StepEasing(0.5);
    let curves: [&dyn Easing; 6] = [&LINEAR, &EASE, &EASE_IN, &EASE_OUT, &EASE_IN_OUT, &step];
    for c in curves {
      assert!(close(c.easing(0.), 0.));
      assert!(close(c.easing(1.), 1.));
    }
  }

  #[test]
  fn ease_in_out_symmetric() {
    assert!(close(EASE_IN_OUT.easing(0.5), 0.5));
    assert!(EASE_IN.easing(0.25) < 0.25);
    assert!(EASE_OUT.easing(0.25) > 0.25);
  }

  #[test]
  fn closure_as_easing() {
    let square = |t: f32| t * t;
    assert!(close(square.easing(0.5), 0.25));
  }

  #[test]
  fn step() {
    let step = StepEasing(0.3);
    assert_eq!(step.easing(0.29), 0.);
    assert_eq!(step.easing(0.3), 1.);
  }
}
