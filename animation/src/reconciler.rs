//! Reconcile the declarative playback mode with the stateful timeline.
//!
//! The host calls [`PlaybackReconciler::mount`] once, then
//! [`PlaybackReconciler::reconfigure`] every time it supplies a new
//! [`AnimationSpec`], and [`PlaybackReconciler::unmount`] at the end (dropping
//! the reconciler unmounts it too).
//!
//! ```text
//!  Uninitialized ──mount──▶ AwaitingDelay ──delay elapsed──▶ Active
//!        │                        │                            │
//!        └──mount without delay───┼───────────────────────────▶│
//!                                 └──────unmount──▶ Disposed ◀─┘
//! ```
//!
//! A mount whose first render fails ends in `Failed`: the timeline is
//! canceled and stays so, only `unmount` leaves that state.
//!
//! Every mode is applied when it is supplied while `Active`, unchanged or
//! not, so supplying `RestartForward` again replays the animation.

use std::{
  cell::{Ref, RefCell},
  rc::{Rc, Weak},
  time::Instant,
};

use rxrust::prelude::*;

use crate::{
  animation_spec::AnimationSpec,
  error::AnimationError,
  host::{AnimationHost, TaskHandle},
  lerp::Lerp,
  status::AnimationStatus,
  timeline::Timeline,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
  Uninitialized,
  /// Mounted, but the start delay not elapsed. No instruction is applied in
  /// this state.
  AwaitingDelay,
  Active,
  /// The first render failed, the timeline is canceled and never started.
  Failed,
  Disposed,
}

pub struct PlaybackReconciler<T, V> {
  host: Rc<dyn AnimationHost>,
  shared: Rc<RefCell<Shared<T, V>>>,
  subscriptions: Vec<SubscriptionGuard<BoxSubscription<'static>>>,
}

struct Shared<T, V> {
  lifecycle: LifecycleState,
  spec: Option<AnimationSpec<T, V>>,
  timeline: Option<Timeline>,
  pending_delay: Option<TaskHandle>,
  view: Option<V>,
  error: Option<AnimationError>,
  last_render_at: Option<Instant>,
}

impl<T: Lerp + 'static, V: 'static> PlaybackReconciler<T, V> {
  pub fn new(host: Rc<dyn AnimationHost>) -> Self {
    let shared = Shared {
      lifecycle: LifecycleState::Uninitialized,
      spec: None,
      timeline: None,
      pending_delay: None,
      view: None,
      error: None,
      last_render_at: None,
    };
    Self { host, shared: Rc::new(RefCell::new(shared)), subscriptions: vec![] }
  }

  /// Create the timeline of `spec`, render the first view and start the
  /// playback, right now or after the delay of the spec.
  pub fn mount(&mut self, spec: AnimationSpec<T, V>) -> Result<(), AnimationError> {
    let lifecycle = self.lifecycle();
    if lifecycle != LifecycleState::Uninitialized {
      log::warn!("Mount a playback reconciler in {lifecycle:?} state, ignored.");
      return Ok(());
    }

    let timeline = Timeline::with_progress(spec.duration(), spec.start_position());
    timeline.bind(self.host.frame_ticker());
    self.subscribe_timeline(&timeline);

    let delay = spec.delay().filter(|d| !d.is_zero());
    {
      let mut shared = self.shared.borrow_mut();
      shared.lifecycle =
        if delay.is_some() { LifecycleState::AwaitingDelay } else { LifecycleState::Active };
      shared.spec = Some(spec);
      shared.timeline = Some(timeline);
    }
    log::debug!("playback reconciler mounted, {:?}", self.lifecycle());

    if let Err(err) = render_frame(&self.shared, None, true) {
      self.shared.borrow_mut().lifecycle = LifecycleState::Failed;
      log::debug!("playback reconciler failed to mount");
      return Err(err);
    }

    match delay {
      Some(delay) => {
        let weak = Rc::downgrade(&self.shared);
        let handle = self.host.delay(delay, Box::new(move || on_delay_elapsed(&weak)));
        self.shared.borrow_mut().pending_delay = Some(handle);
      }
      None => start(&self.shared),
    }
    Ok(())
  }

  /// Supply a new spec. The timeline keeps its progress, takes the new
  /// duration and, if active, the instruction of the new mode is applied even
  /// if the mode not changed.
  pub fn reconfigure(&mut self, spec: AnimationSpec<T, V>) -> Result<(), AnimationError> {
    let (lifecycle, timeline) = {
      let shared = self.shared.borrow();
      (shared.lifecycle, shared.timeline.clone())
    };
    let timeline = match (lifecycle, timeline) {
      (LifecycleState::Uninitialized, _) => {
        log::warn!("Reconfigure a playback reconciler not mounted, ignored.");
        return Ok(());
      }
      (LifecycleState::Failed, _) => {
        log::warn!("Reconfigure a playback reconciler failed to mount, ignored.");
        return Ok(());
      }
      (LifecycleState::Disposed, _) | (_, None) => return Ok(()),
      (_, Some(timeline)) => timeline,
    };

    timeline.set_duration(spec.duration());
    // The old spec may hold anything, drop it outside the borrow.
    let old = self.shared.borrow_mut().spec.replace(spec);
    drop(old);

    if lifecycle == LifecycleState::Active {
      apply_mode(&self.shared);
    }
    // Range, curve or render may changed, the view is rebuilt either way.
    render_frame(&self.shared, None, true)
  }

  /// Render the view of the current value right now.
  pub fn render(&self) -> Result<(), AnimationError> { render_frame(&self.shared, None, true) }

  #[inline]
  pub fn lifecycle(&self) -> LifecycleState { self.shared.borrow().lifecycle }

  /// The progress of the timeline, `None` if not mounted.
  pub fn progress(&self) -> Option<f32> { self.timeline().map(|t| t.progress()) }

  pub fn status(&self) -> Option<AnimationStatus> { self.timeline().map(|t| t.status()) }

  /// The interpolated value at the current progress.
  pub fn value(&self) -> Option<T> {
    let shared = self.shared.borrow();
    let (Some(spec), Some(timeline)) = (shared.spec.as_ref(), shared.timeline.as_ref()) else {
      return None;
    };
    Some(spec.value_at(timeline.progress()))
  }

  /// The last rendered view.
  pub fn view(&self) -> Option<Ref<'_, V>> {
    Ref::filter_map(self.shared.borrow(), |s| s.view.as_ref()).ok()
  }

  pub fn take_view(&self) -> Option<V> { self.shared.borrow_mut().view.take() }

  /// The render failure happened in a frame, if any.
  pub fn take_error(&self) -> Option<AnimationError> { self.shared.borrow_mut().error.take() }

  /// The timeline controlled by this reconciler, `None` if not mounted.
  pub fn timeline(&self) -> Option<Timeline> { self.shared.borrow().timeline.clone() }

  fn subscribe_timeline(&mut self, timeline: &Timeline) {
    let weak = Rc::downgrade(&self.shared);
    let host = self.host.clone();
    let on_progress = timeline.progress_stream().subscribe(move |_| {
      if let Some(shared) = weak.upgrade() {
        // Failures are kept in `error` and reported by `take_error`.
        let _ = render_frame(&shared, Some(host.now()), false);
      }
    });

    let weak = Rc::downgrade(&self.shared);
    let on_status = timeline
      .status_stream()
      .subscribe(move |status| notify_status(&weak, status));

    self.subscriptions.push(on_progress.unsubscribe_when_dropped());
    self.subscriptions.push(on_status.unsubscribe_when_dropped());
  }
}

impl<T, V> PlaybackReconciler<T, V> {
  /// Tear down the timeline. Any pending delay is cancelled and no
  /// instruction or render happens after this call.
  pub fn unmount(&mut self) {
    let (timeline, pending, spec) = {
      let mut shared = self.shared.borrow_mut();
      if shared.lifecycle == LifecycleState::Disposed {
        return;
      }
      shared.lifecycle = LifecycleState::Disposed;
      (shared.timeline.take(), shared.pending_delay.take(), shared.spec.take())
    };

    if let Some(pending) = pending {
      pending.cancel();
    }
    self.subscriptions.clear();
    if let Some(timeline) = timeline {
      timeline.dispose();
    }
    // Release user closures outside the borrow, their drop may run any code.
    drop(spec);
    log::debug!("playback reconciler unmounted");
  }
}

impl<T, V> Drop for PlaybackReconciler<T, V> {
  fn drop(&mut self) { self.unmount() }
}

fn on_delay_elapsed<T, V>(weak: &Weak<RefCell<Shared<T, V>>>) {
  let Some(shared) = weak.upgrade() else { return };
  {
    let mut this = shared.borrow_mut();
    this.pending_delay.take();
    if this.lifecycle != LifecycleState::AwaitingDelay {
      return;
    }
    this.lifecycle = LifecycleState::Active;
  }
  log::debug!("playback delay elapsed");
  start(&shared);
}

/// Enter the active state, apply the current mode and report the start.
fn start<T, V>(shared: &Rc<RefCell<Shared<T, V>>>) {
  apply_mode(shared);
  let on_started = {
    let this = shared.borrow();
    if this.lifecycle != LifecycleState::Active {
      return;
    }
    this.spec.as_ref().and_then(|s| s.on_started.clone())
  };
  if let Some(on_started) = on_started {
    (&mut *on_started.borrow_mut())(());
  }
}

fn apply_mode<T, V>(shared: &Rc<RefCell<Shared<T, V>>>) {
  let (mode, timeline) = {
    let this = shared.borrow();
    if this.lifecycle != LifecycleState::Active {
      return;
    }
    let (Some(spec), Some(timeline)) = (this.spec.as_ref(), this.timeline.clone()) else { return };
    (spec.mode(), timeline)
  };
  mode.apply(&timeline);
}

fn notify_status<T, V>(weak: &Weak<RefCell<Shared<T, V>>>, status: AnimationStatus) {
  let Some(shared) = weak.upgrade() else { return };
  let (observer, on_completed) = {
    let this = shared.borrow();
    if this.lifecycle == LifecycleState::Disposed {
      return;
    }
    let Some(spec) = this.spec.as_ref() else { return };
    let on_completed = spec.on_completed.clone().filter(|_| status.is_completed());
    (spec.status_observer.clone(), on_completed)
  };

  if let Some(observer) = observer {
    (&mut *observer.borrow_mut())(status);
  }
  if let Some(on_completed) = on_completed {
    (&mut *on_completed.borrow_mut())(());
  }
}

/// Rebuild the view from the current value. A `force` render ignores the
/// fps limit of the spec.
fn render_frame<T: Lerp, V>(
  shared: &Rc<RefCell<Shared<T, V>>>, now: Option<Instant>, force: bool,
) -> Result<(), AnimationError> {
  let timeline = {
    let mut this = shared.borrow_mut();
    if matches!(this.lifecycle, LifecycleState::Uninitialized | LifecycleState::Disposed) {
      return Ok(());
    }
    let Some(timeline) = this.timeline.clone() else { return Ok(()) };
    let last_render_at = this.last_render_at;
    let Some(spec) = this.spec.as_mut() else { return Ok(()) };

    if !force && timeline.is_running() {
      if let (Some(interval), Some(now), Some(last)) = (spec.frame_interval(), now, last_render_at) {
        if now.saturating_duration_since(last) < interval {
          return Ok(());
        }
      }
    }

    let value = spec.value_at(timeline.progress());
    match spec.dispatch_render(value) {
      Ok(view) => {
        this.view = Some(view);
        if now.is_some() {
          this.last_render_at = now;
        }
        return Ok(());
      }
      Err(err) => {
        log::error!("{err}");
        this.error = Some(err);
        timeline
      }
    }
  };

  timeline.stop(true);
  Err(AnimationError::RenderDispatch)
}
