use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  convert::Infallible,
  rc::{Rc, Weak},
  time::{Duration, Instant},
};

use rxrust::prelude::*;

use crate::{
  status::{AnimationStatus, Direction},
  ticker::{FrameMsg, FrameTicker},
};

/// A stateful progress controller, progress move from `0` to `1` (or back)
/// over `duration` as frames ticked.
///
/// `Timeline` is a cheap handle, clones control the same timeline. Listeners
/// are notified after the timeline finished its state change, so a listener
/// is free to read or drive the timeline again. The changes a listener causes
/// are queued and emitted, in order, once the current emission returns.
#[derive(Clone)]
pub struct Timeline(Rc<TimelineInner>);

struct TimelineInner {
  state: RefCell<TimelineState>,
  progress: Subject<'static, f32, Infallible>,
  status: Subject<'static, AnimationStatus, Infallible>,
  queued: RefCell<VecDeque<Change>>,
  emitting: Cell<bool>,
  frame_guard: RefCell<Option<SubscriptionGuard<BoxSubscription<'static>>>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Change {
  Progress(f32),
  Status(AnimationStatus),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Behavior {
  /// Stop when reach the bound of the direction.
  Once,
  /// Jump back to `0` when reach `1`.
  Loop,
  /// Turn around when reach either bound.
  Mirror,
}

struct TimelineState {
  duration: Duration,
  progress: f32,
  direction: Direction,
  behavior: Behavior,
  running: bool,
  /// The instant of the last frame that moved the progress, `None` until the
  /// first frame after a start.
  last_frame: Option<Instant>,
  status: AnimationStatus,
  disposed: bool,
}

#[derive(Default)]
struct Changes {
  progress: Option<f32>,
  status: Option<AnimationStatus>,
}

impl TimelineState {
  fn set_progress(&mut self, progress: f32, changes: &mut Changes) {
    let progress = progress.clamp(0., 1.);
    if progress != self.progress {
      self.progress = progress;
      changes.progress = Some(progress);
    }
  }

  fn set_status(&mut self, status: AnimationStatus, changes: &mut Changes) {
    if status != self.status {
      self.status = status;
      changes.status = Some(status);
    }
  }

  fn sync_status(&mut self, changes: &mut Changes) {
    let status = if self.running {
      AnimationStatus::running(self.direction)
    } else {
      AnimationStatus::stopped_at(self.progress)
    };
    self.set_status(status, changes);
  }

  fn play(&mut self, direction: Direction, behavior: Behavior, changes: &mut Changes) {
    self.direction = direction;
    self.behavior = behavior;
    if behavior == Behavior::Once && self.progress == direction.target() {
      self.halt();
    } else {
      if !self.running {
        self.last_frame = None;
      }
      self.running = true;
    }
    self.sync_status(changes);
  }

  fn halt(&mut self) {
    self.running = false;
    self.last_frame = None;
  }

  fn advance(&mut self, now: Instant, changes: &mut Changes) {
    if !self.running {
      return;
    }
    let Some(last) = self.last_frame.replace(now) else { return };

    if self.duration.is_zero() {
      if self.behavior != Behavior::Once {
        log::warn!("A repeating timeline with zero duration stopped at its end.");
      }
      let target = match self.behavior {
        Behavior::Once => self.direction.target(),
        Behavior::Loop | Behavior::Mirror => 1.,
      };
      self.set_progress(target, changes);
      self.halt();
      self.sync_status(changes);
      return;
    }

    let delta = now.saturating_duration_since(last).as_secs_f32() / self.duration.as_secs_f32();
    if delta <= 0. {
      return;
    }

    match self.behavior {
      Behavior::Once => {
        let target = self.direction.target();
        let progress = match self.direction {
          Direction::Forward => (self.progress + delta).min(target),
          Direction::Reverse => (self.progress - delta).max(target),
        };
        self.set_progress(progress, changes);
        if progress == target {
          self.halt();
        }
      }
      Behavior::Loop => {
        self.set_progress((self.progress + delta).rem_euclid(1.), changes);
      }
      Behavior::Mirror => {
        // Unfold a round trip onto `[0, 2)`, the second half is the way back.
        let phase = match self.direction {
          Direction::Forward => self.progress,
          Direction::Reverse => 2. - self.progress,
        };
        let phase = (phase + delta).rem_euclid(2.);
        if phase <= 1. {
          self.direction = Direction::Forward;
          self.set_progress(phase, changes);
        } else {
          self.direction = Direction::Reverse;
          self.set_progress(2. - phase, changes);
        }
      }
    }
    self.sync_status(changes);
  }
}

impl Timeline {
  pub fn new(duration: Duration) -> Self { Self::with_progress(duration, 0.) }

  /// Create a stopped timeline at `progress`.
  pub fn with_progress(duration: Duration, progress: f32) -> Self {
    let progress = progress.clamp(0., 1.);
    let state = TimelineState {
      duration,
      progress,
      direction: Direction::Forward,
      behavior: Behavior::Once,
      running: false,
      last_frame: None,
      status: AnimationStatus::stopped_at(progress),
      disposed: false,
    };
    Self(Rc::new(TimelineInner {
      state: RefCell::new(state),
      progress: <_>::default(),
      status: <_>::default(),
      queued: <_>::default(),
      emitting: Cell::new(false),
      frame_guard: RefCell::new(None),
    }))
  }

  #[inline]
  pub fn progress(&self) -> f32 { self.0.state.borrow().progress }

  #[inline]
  pub fn status(&self) -> AnimationStatus { self.0.state.borrow().status }

  #[inline]
  pub fn direction(&self) -> Direction { self.0.state.borrow().direction }

  #[inline]
  pub fn duration(&self) -> Duration { self.0.state.borrow().duration }

  #[inline]
  pub fn is_running(&self) -> bool { self.0.state.borrow().running }

  /// Running toward `1`, whichever the behavior is.
  pub fn is_running_forward(&self) -> bool {
    let state = self.0.state.borrow();
    state.running && state.direction == Direction::Forward
  }

  #[inline]
  pub fn is_disposed(&self) -> bool { self.0.state.borrow().disposed }

  /// Change the duration in place, the progress is kept.
  pub fn set_duration(&self, duration: Duration) {
    self.mutate("set_duration", |state, _| state.duration = duration);
  }

  /// Jump to `progress` without changing the running state.
  pub fn set_progress(&self, progress: f32) {
    self.mutate("set_progress", |state, changes| {
      state.set_progress(progress, changes);
      state.sync_status(changes);
    });
  }

  /// Play toward `1` from `from` or the current progress, and stop at the
  /// end.
  pub fn forward(&self, from: Option<f32>) {
    self.mutate("forward", |state, changes| {
      if let Some(from) = from {
        state.set_progress(from, changes);
      }
      state.play(Direction::Forward, Behavior::Once, changes);
    });
  }

  /// Play toward `0` from `from` or the current progress, and stop at the
  /// start.
  pub fn reverse(&self, from: Option<f32>) {
    self.mutate("reverse", |state, changes| {
      if let Some(from) = from {
        state.set_progress(from, changes);
      }
      state.play(Direction::Reverse, Behavior::Once, changes);
    });
  }

  /// Play toward `1` forever. Jump back to `0` at the end, or turn around at
  /// both bounds if `reverse` is true.
  pub fn repeat(&self, reverse: bool) {
    let behavior = if reverse { Behavior::Mirror } else { Behavior::Loop };
    self.mutate("repeat", |state, changes| state.play(Direction::Forward, behavior, changes));
  }

  /// Stop at the current progress. A canceled stop reports
  /// `AnimationStatus::Canceled` instead of the status of the position.
  pub fn stop(&self, canceled: bool) {
    self.mutate("stop", |state, changes| {
      state.halt();
      if canceled {
        state.set_status(AnimationStatus::Canceled, changes);
      } else {
        state.sync_status(changes);
      }
    });
  }

  /// Advance the progress to the frame at `now`. The first frame after the
  /// timeline started only records the instant.
  pub fn tick(&self, now: Instant) {
    let changes = {
      let mut state = self.0.state.borrow_mut();
      let mut changes = Changes::default();
      if !state.disposed {
        state.advance(now, &mut changes);
      }
      changes
    };
    self.notify(changes);
  }

  /// The stream of every progress change.
  pub fn progress_stream(&self) -> ops::box_it::BoxOp<'static, f32, Infallible> {
    self.0.progress.clone().box_it()
  }

  /// The stream of every status change.
  pub fn status_stream(&self) -> ops::box_it::BoxOp<'static, AnimationStatus, Infallible> {
    self.0.status.clone().box_it()
  }

  /// Drive the timeline by the `ticker`, replace the previous binding.
  pub fn bind(&self, ticker: &FrameTicker) {
    let this: Weak<TimelineInner> = Rc::downgrade(&self.0);
    let guard = ticker
      .frame_tick_stream()
      .subscribe(move |msg| {
        if let (FrameMsg::Ready(now), Some(inner)) = (msg, this.upgrade()) {
          Timeline(inner).tick(now);
        }
      })
      .unsubscribe_when_dropped();
    *self.0.frame_guard.borrow_mut() = Some(guard);
  }

  /// Stop the timeline and release the ticker and all listeners. Every
  /// operation after dispose is ignored.
  pub fn dispose(&self) {
    {
      let mut state = self.0.state.borrow_mut();
      if state.disposed {
        return;
      }
      state.disposed = true;
      state.halt();
    }
    self.0.frame_guard.borrow_mut().take();
    // In the middle of an emission the listeners are released when it ends.
    if !self.0.emitting.get() {
      self.release_listeners();
    }
  }

  fn mutate(&self, op: &str, f: impl FnOnce(&mut TimelineState, &mut Changes)) {
    let changes = {
      let mut state = self.0.state.borrow_mut();
      if state.disposed {
        log::warn!("Timeline::{op} called on a disposed timeline, ignored.");
        return;
      }
      let mut changes = Changes::default();
      f(&mut *state, &mut changes);
      changes
    };
    self.notify(changes);
  }

  fn notify(&self, changes: Changes) {
    {
      let mut queued = self.0.queued.borrow_mut();
      queued.extend(changes.progress.map(Change::Progress));
      queued.extend(changes.status.map(Change::Status));
    }
    if self.0.emitting.replace(true) {
      return;
    }

    loop {
      let next = self.0.queued.borrow_mut().pop_front();
      let Some(change) = next else { break };
      if self.is_disposed() {
        self.0.queued.borrow_mut().clear();
        break;
      }
      match change {
        Change::Progress(p) => self.0.progress.clone().next(p),
        Change::Status(s) => self.0.status.clone().next(s),
      }
    }
    self.0.emitting.set(false);

    if self.is_disposed() {
      self.release_listeners();
    }
  }

  fn release_listeners(&self) {
    self.0.progress.clone().unsubscribe();
    self.0.status.clone().unsubscribe();
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;

  const SEC: Duration = Duration::from_secs(1);

  fn ms(v: u64) -> Duration { Duration::from_millis(v) }

  fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

  #[test]
  fn forward_to_end() {
    let timeline = Timeline::new(SEC);
    let start = Instant::now();
    timeline.forward(None);
    assert_eq!(timeline.status(), AnimationStatus::Forward);

    timeline.tick(start);
    assert_eq!(timeline.progress(), 0.);
    timeline.tick(start + ms(250));
    assert!(close(timeline.progress(), 0.25));
    timeline.tick(start + ms(2000));
    assert_eq!(timeline.progress(), 1.);
    assert_eq!(timeline.status(), AnimationStatus::Completed);
    assert!(!timeline.is_running());
  }

  #[test]
  fn reverse_from_current() {
    let timeline = Timeline::with_progress(SEC, 0.5);
    let start = Instant::now();
    timeline.reverse(None);
    timeline.tick(start);
    timeline.tick(start + ms(250));
    assert!(close(timeline.progress(), 0.25));
    timeline.tick(start + ms(750));
    assert_eq!(timeline.status(), AnimationStatus::Dismissed);
  }

  #[test]
  fn stop_keep_progress() {
    let timeline = Timeline::new(SEC);
    let start = Instant::now();
    timeline.forward(None);
    timeline.tick(start);
    timeline.tick(start + ms(500));
    timeline.stop(false);
    assert_eq!(timeline.status(), AnimationStatus::Idle);

    timeline.tick(start + ms(900));
    assert!(close(timeline.progress(), 0.5));

    timeline.stop(true);
    assert_eq!(timeline.status(), AnimationStatus::Canceled);
  }

  #[test]
  fn play_at_bound_finish_at_once() {
    let timeline = Timeline::with_progress(SEC, 1.);
    timeline.forward(None);
    assert!(!timeline.is_running());
    assert_eq!(timeline.status(), AnimationStatus::Completed);
  }

  #[test]
  fn loop_wraps_to_start() {
    let timeline = Timeline::new(SEC);
    let start = Instant::now();
    timeline.repeat(false);
    timeline.tick(start);
    timeline.tick(start + ms(750));
    assert!(close(timeline.progress(), 0.75));
    timeline.tick(start + ms(1250));
    assert!(close(timeline.progress(), 0.25));
    assert_eq!(timeline.status(), AnimationStatus::Forward);
  }

  #[test]
  fn mirror_turns_around() {
    let timeline = Timeline::new(SEC);
    let start = Instant::now();
    timeline.repeat(true);
    timeline.tick(start);

    let statuses = Rc::new(RefCell::new(vec![]));
    let c_statuses = statuses.clone();
    let _u = timeline
      .status_stream()
      .subscribe(move |s| c_statuses.borrow_mut().push(s));

    let mut seen = vec![];
    for i in 1..=12 {
      timeline.tick(start + ms(250 * i));
      seen.push(timeline.progress());
    }
    let expect = [0.25, 0.5, 0.75, 1., 0.75, 0.5, 0.25, 0., 0.25, 0.5, 0.75, 1.];
    assert!(seen.iter().zip(expect).all(|(a, b)| close(*a, b)), "{seen:?}");
    assert_eq!(
      &*statuses.borrow(),
      &[AnimationStatus::Reverse, AnimationStatus::Forward]
    );
  }

  #[test]
  fn duration_change_keep_progress() {
    let timeline = Timeline::new(SEC);
    let start = Instant::now();
    timeline.forward(None);
    timeline.tick(start);
    timeline.tick(start + ms(500));

    timeline.set_duration(SEC * 2);
    assert!(close(timeline.progress(), 0.5));
    timeline.tick(start + ms(1000));
    assert!(close(timeline.progress(), 0.75));
  }

  #[test]
  fn zero_duration_jump_to_end() {
    let timeline = Timeline::new(Duration::ZERO);
    let start = Instant::now();
    timeline.forward(None);
    timeline.tick(start);
    timeline.tick(start);
    assert_eq!(timeline.status(), AnimationStatus::Completed);
  }

  #[test]
  fn listeners_may_drive_timeline() {
    let timeline = Timeline::new(SEC);
    let c_timeline = timeline.clone();
    let statuses = Rc::new(RefCell::new(vec![]));
    let c_statuses = statuses.clone();
    let _u = timeline.status_stream().subscribe(move |s| {
      c_statuses.borrow_mut().push(s);
      if s == AnimationStatus::Completed {
        c_timeline.reverse(None);
      }
    });

    let start = Instant::now();
    timeline.forward(None);
    timeline.tick(start);
    timeline.tick(start + SEC);
    assert_eq!(timeline.status(), AnimationStatus::Reverse);
    // The change made by a listener is still delivered, after the one it
    // reacted to.
    assert_eq!(
      &*statuses.borrow(),
      &[AnimationStatus::Forward, AnimationStatus::Completed, AnimationStatus::Reverse]
    );
  }

  #[test]
  fn queued_changes_keep_order() {
    let timeline = Timeline::new(SEC);
    let c_timeline = timeline.clone();
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    let _p = timeline.progress_stream().subscribe(move |p| {
      c_events.borrow_mut().push(format!("progress {p}"));
      if p == 0.5 {
        c_timeline.set_progress(0.25);
      }
    });
    let c_events = events.clone();
    let _s = timeline
      .status_stream()
      .subscribe(move |s| c_events.borrow_mut().push(format!("{s:?}")));

    timeline.set_progress(0.5);
    assert_eq!(
      &*events.borrow(),
      &["progress 0.5", "Idle", "progress 0.25"]
    );
  }

  #[test]
  fn bind_to_ticker() {
    let ticker = FrameTicker::default();
    let timeline = Timeline::new(SEC);
    timeline.bind(&ticker);
    timeline.forward(None);

    let start = Instant::now();
    ticker.emit(FrameMsg::Ready(start));
    ticker.emit(FrameMsg::Ready(start + ms(500)));
    assert!(close(timeline.progress(), 0.5));

    timeline.dispose();
    ticker.emit(FrameMsg::Ready(start + SEC));
    assert!(close(timeline.progress(), 0.5));
  }

  #[test]
  fn disposed_timeline_ignore_operations() {
    let timeline = Timeline::new(SEC);
    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    let _u = timeline
      .progress_stream()
      .subscribe(move |_| *c_hits.borrow_mut() += 1);

    timeline.dispose();
    timeline.forward(Some(0.5));
    assert_eq!(timeline.progress(), 0.);
    assert!(!timeline.is_running());
    assert_eq!(*hits.borrow(), 0);
  }
}
