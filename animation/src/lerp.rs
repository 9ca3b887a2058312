/// Linearly interpolate between two value.
///
/// * `factor`: the percent of the distance between two value to advance. It's
///   usually in `[0, 1]`, but an easing curve may overshoot it.
pub trait Lerp {
  fn lerp(&self, to: &Self, factor: f32) -> Self;
}

macro_rules! impl_lerp_for_integer {
  ($($ty: ident), *) => {
    $(
      impl Lerp for $ty {
        #[inline]
        fn lerp(&self, to: &Self, factor: f32) -> Self {
          (*self as f64 * (1. - factor as f64) + *to as f64 * factor as f64).round() as $ty
        }
      }
    )*
  }
}

impl_lerp_for_integer! { i8, i16, i32, i64, isize, u8, u16, u32, u64, usize }

impl Lerp for f32 {
  #[inline]
  fn lerp(&self, to: &Self, factor: f32) -> Self { factor.mul_add(to - self, *self) }
}

impl Lerp for f64 {
  #[inline]
  fn lerp(&self, to: &Self, factor: f32) -> Self { (factor as f64).mul_add(to - self, *self) }
}

impl Lerp for bool {
  #[inline]
  fn lerp(&self, to: &Self, factor: f32) -> Self { if factor == 0. { *self } else { *to } }
}

impl<V: Lerp + Default> Lerp for Option<V> {
  fn lerp(&self, to: &Self, factor: f32) -> Self {
    match (self, to) {
      (Some(from), Some(to)) => Some(from.lerp(to, factor)),
      (None, None) => None,
      (None, Some(to)) => Some(V::default().lerp(to, factor)),
      (Some(from), None) => Some(from.lerp(&V::default(), factor)),
    }
  }
}

impl<V: Lerp, const N: usize> Lerp for [V; N] {
  fn lerp(&self, to: &Self, factor: f32) -> Self {
    std::array::from_fn(|i| self[i].lerp(&to[i], factor))
  }
}

macro_rules! impl_lerp_for_tuple {
  ($ty: ident, $idx: tt $(,$other_ty: ident, $other_idx: tt)*) => {
    impl_lerp_for_tuple!({$ty, $idx} $($other_ty, $other_idx),*);
  };
  (
    {$($ty: ident, $idx: tt),+}
    $next_ty: ident, $next_idx: tt
    $(,$other_ty: ident, $other_idx: tt)*
  ) => {
      impl_lerp_for_tuple!({$($ty, $idx),+});
      impl_lerp_for_tuple!(
        {$($ty, $idx,)+ $next_ty, $next_idx }
        $($other_ty, $other_idx),*
      );
  };
  ({$($ty: ident, $index: tt),*}) => {
    impl <$($ty: Lerp,)*> Lerp for ($($ty),*,) {
      fn lerp(&self, to: &Self, factor: f32) -> Self {
        ($( self.$index.lerp(&to.$index, factor),)*)
      }
    }
  }
}

impl_lerp_for_tuple! {T0, 0, T1, 1, T2, 2, T3, 3, T4, 4, T5, 5, T6, 6, T7, 7,
  T8, 8, T9, 9, T10, 10, T11, 11
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lerp_f32() {
    let eq = |f1: f32, f2: f32| (f1 - f2).abs() < f32::EPSILON;
    assert!(eq(Lerp::lerp(&0., &10., 0.5), 5.));
    assert!(eq(Lerp::lerp(&5., &10., 0.), 5.));
    assert!(eq(Lerp::lerp(&5., &10., 2.), 15.));
    assert!(eq(Lerp::lerp(&10., &0., 0.2), 8.));
  }

  #[test]
  fn lerp_tuple() {
    let t1 = (0., 0.5, 10_i32);
    let t2 = (1., 1., 20_i32);

    assert!((0.5, 0.75, 15) == Lerp::lerp(&t1, &t2, 0.5));
    assert!(t2 == Lerp::lerp(&t1, &t2, 1.));
    assert!(t1 == Lerp::lerp(&t1, &t2, 0.));
  }

  #[test]
  fn lerp_array() {
    let rgba: [u8; 4] = [0, 0, 0, 255];
    assert_eq!(rgba.lerp(&[255, 255, 255, 255], 0.5), [128, 128, 128, 255]);
  }

  #[test]
  fn lerp_option() {
    assert_eq!(None::<f32>.lerp(&None, 0.5), None);
    assert_eq!(None.lerp(&Some(10_i32), 0.5), Some(5));
  }

  #[test]
  fn fix_avoid_calc_overflow() {
    assert_eq!(255u8.lerp(&0u8, 0.), 255);
    assert_eq!(u64::MAX.lerp(&u64::MAX, 1.), u64::MAX);
  }
}
