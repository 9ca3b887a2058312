use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::{
  animation_spec::{AnimationSpec, AnimationSpecBuilder},
  host::FrameHost,
  lerp::Lerp,
  reconciler::PlaybackReconciler,
};

/// Record every value rendered, cloned handles share the same records.
#[derive(Clone)]
pub struct RenderLog<T>(Rc<RefCell<Vec<T>>>);

impl<T: Clone + 'static> RenderLog<T> {
  pub fn new() -> Self { Self(<_>::default()) }

  /// A render closure records the value and renders it as the view.
  pub fn recorder(&self) -> impl FnMut(T) -> T + 'static {
    let log = self.0.clone();
    move |v: T| {
      log.borrow_mut().push(v.clone());
      v
    }
  }

  pub fn values(&self) -> Vec<T> { self.0.borrow().clone() }

  pub fn last(&self) -> Option<T> { self.0.borrow().last().cloned() }

  pub fn len(&self) -> usize { self.0.borrow().len() }

  pub fn is_empty(&self) -> bool { self.0.borrow().is_empty() }

  pub fn clear(&self) { self.0.borrow_mut().clear() }
}

impl<T: Clone + 'static> Default for RenderLog<T> {
  fn default() -> Self { Self::new() }
}

/// A spec builder with `range` and `duration` set, and the `log` recorder as
/// its render.
pub fn recorded_spec<T: Lerp + Clone + 'static>(
  range: (T, T), duration: Duration, log: &RenderLog<T>,
) -> AnimationSpecBuilder<T, T> {
  AnimationSpec::builder()
    .range(range)
    .duration(duration)
    .render(log.recorder())
}

/// Mount `spec` on a new reconciler of a new [`FrameHost`], and draw the
/// first frame so the next `advance` moves the timeline.
pub fn mount_on_frame_host<T: Lerp + 'static, V: 'static>(
  spec: AnimationSpec<T, V>,
) -> (FrameHost, PlaybackReconciler<T, V>) {
  let host = FrameHost::new();
  let mut reconciler = PlaybackReconciler::new(Rc::new(host.clone()));
  if let Err(err) = reconciler.mount(spec) {
    log::error!("mount for test failed: {err}");
  }
  host.draw_frame();
  (host, reconciler)
}

/// Assert two progress values are equal within `1e-4`.
#[macro_export]
macro_rules! assert_progress {
  ($left: expr, $right: expr $(,)?) => {{
    let (left, right): (f32, f32) = ($left, $right);
    assert!((left - right).abs() < 1e-4, "progress {left} is not close to {right}",);
  }};
}
