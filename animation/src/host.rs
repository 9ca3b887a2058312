//! The runtime an animation lives in.
//!
//! A host provides three things: the current time, a frame ticker that drives
//! every mounted timeline, and a way to run a task once after a delay. A GUI
//! framework implements [`AnimationHost`] on top of its own event loop, a
//! delay there is usually an `observable::timer_at` of its scheduler;
//! [`FrameHost`] is a self-contained implementation that is driven by calling
//! [`FrameHost::advance_to`] from whatever loop the application runs.

use std::{
  cell::{Cell, RefCell},
  convert::Infallible,
  rc::Rc,
  time::{Duration, Instant},
};

use rxrust::prelude::*;

use crate::ticker::{FrameMsg, FrameTicker};

pub trait AnimationHost {
  /// The monotonic time of the host.
  fn now(&self) -> Instant;

  /// The ticker every timeline listen to.
  fn frame_ticker(&self) -> &FrameTicker;

  /// Run `task` once after `after` elapsed. The task must never run after
  /// the returned handle is cancelled.
  fn delay(&self, after: Duration, task: Box<dyn FnOnce()>) -> TaskHandle;
}

/// A one-shot task shared between its handle and the subscription that runs
/// it.
#[derive(Clone)]
pub struct PendingTask(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

/// The handle of a scheduled one-shot task.
///
/// Cancelling unsubscribes the timer and drops the task closure immediately,
/// so nothing captured by the task outlives the cancellation.
pub struct TaskHandle {
  task: PendingTask,
  subscription: BoxSubscription<'static>,
}

impl PendingTask {
  pub fn new(task: Box<dyn FnOnce()>) -> Self { Self(Rc::new(RefCell::new(Some(task)))) }

  /// Run the task if it neither ran nor was cancelled.
  pub fn run(&self) {
    // Release the cell before running, the task may look at itself.
    let task = self.0.borrow_mut().take();
    if let Some(task) = task {
      task();
    }
  }

  #[inline]
  pub fn is_pending(&self) -> bool { self.0.borrow().is_some() }

  fn drop_task(&self) { self.0.borrow_mut().take(); }
}

impl TaskHandle {
  /// Pair the `task` with the `subscription` of the timer that runs it.
  #[inline]
  pub fn new(task: PendingTask, subscription: BoxSubscription<'static>) -> Self {
    Self { task, subscription }
  }

  pub fn cancel(self) {
    self.task.drop_task();
    self.subscription.unsubscribe();
  }

  /// The task is neither executed nor cancelled yet.
  #[inline]
  pub fn is_pending(&self) -> bool { self.task.is_pending() }
}

/// A single threaded host driven by hand.
///
/// Every call of `advance_to` first emits the new instant through its clock,
/// which runs the delayed tasks due at that instant in the order they were
/// scheduled, then emits `FrameMsg::Ready(now)` and `FrameMsg::Finish`
/// through its ticker.
#[derive(Clone)]
pub struct FrameHost {
  now: Rc<Cell<Instant>>,
  clock: Subject<'static, Instant, Infallible>,
  ticker: FrameTicker,
  tasks: Rc<RefCell<Vec<PendingTask>>>,
}

impl FrameHost {
  pub fn new() -> Self { Self::start_at(Instant::now()) }

  /// Create a host of which the clock starts at `at`.
  pub fn start_at(at: Instant) -> Self {
    Self {
      now: Rc::new(Cell::new(at)),
      clock: <_>::default(),
      ticker: <_>::default(),
      tasks: <_>::default(),
    }
  }

  /// Move the clock forward by `by` and draw a frame.
  #[inline]
  pub fn advance(&self, by: Duration) { self.advance_to(self.now.get() + by) }

  /// Move the clock to `now` and draw a frame. A `now` earlier than the
  /// current clock is clamped, the host clock never goes back.
  pub fn advance_to(&self, now: Instant) {
    let now = now.max(self.now.get());
    self.now.set(now);

    self.clock.clone().next(now);
    self.ticker.emit(FrameMsg::Ready(now));
    self.ticker.emit(FrameMsg::Finish);
  }

  /// Draw a frame without moving the clock.
  #[inline]
  pub fn draw_frame(&self) { self.advance_to(self.now.get()) }

  /// Count of the tasks still waiting to run.
  pub fn pending_tasks(&self) -> usize {
    let mut tasks = self.tasks.borrow_mut();
    tasks.retain(PendingTask::is_pending);
    tasks.len()
  }
}

impl Default for FrameHost {
  fn default() -> Self { Self::new() }
}

impl AnimationHost for FrameHost {
  #[inline]
  fn now(&self) -> Instant { self.now.get() }

  #[inline]
  fn frame_ticker(&self) -> &FrameTicker { &self.ticker }

  fn delay(&self, after: Duration, task: Box<dyn FnOnce()>) -> TaskHandle {
    let at = self.now.get() + after;
    let task = PendingTask::new(task);
    self.tasks.borrow_mut().push(task.clone());

    let due: ops::box_it::BoxOp<'static, Instant, Infallible> = self
      .clock
      .clone()
      .filter(move |now| *now >= at)
      .take(1)
      .box_it();
    let c_task = task.clone();
    let subscription = due.subscribe(move |_| c_task.run());
    TaskHandle::new(task, subscription)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn delay_task_run_once_when_due() {
    let host = FrameHost::new();
    let hits = Rc::new(Cell::new(0));
    let c_hits = hits.clone();
    let handle = host.delay(
      Duration::from_millis(100),
      Box::new(move || c_hits.set(c_hits.get() + 1)),
    );

    host.advance(Duration::from_millis(99));
    assert_eq!(hits.get(), 0);
    assert!(handle.is_pending());
    assert_eq!(host.pending_tasks(), 1);

    host.advance(Duration::from_millis(1));
    assert_eq!(hits.get(), 1);
    assert!(!handle.is_pending());
    assert_eq!(host.pending_tasks(), 0);

    host.advance(Duration::from_millis(100));
    assert_eq!(hits.get(), 1);
  }

  #[test]
  fn cancelled_task_dropped() {
    let host = FrameHost::new();
    let captured = Rc::new(());
    let c_captured = captured.clone();
    let handle = host.delay(Duration::from_millis(10), Box::new(move || drop(c_captured)));
    assert_eq!(Rc::strong_count(&captured), 2);

    handle.cancel();
    assert_eq!(Rc::strong_count(&captured), 1);
    assert_eq!(host.pending_tasks(), 0);
  }

  #[test]
  fn due_tasks_run_in_schedule_order() {
    let host = FrameHost::new();
    let order = Rc::new(RefCell::new(vec![]));
    let mut handles = vec![];
    for (name, ms) in [("late", 20), ("early", 10), ("never", 40)] {
      let c_order = order.clone();
      handles.push(host.delay(
        Duration::from_millis(ms),
        Box::new(move || c_order.borrow_mut().push(name)),
      ));
    }

    host.advance(Duration::from_millis(30));
    assert_eq!(&*order.borrow(), &["late", "early"]);
    assert_eq!(host.pending_tasks(), 1);
  }

  #[test]
  fn timers_fire_before_frame() {
    let host = FrameHost::new();
    let order = Rc::new(RefCell::new(vec![]));
    let c_order = order.clone();
    let _frame = host
      .frame_ticker()
      .frame_tick_stream()
      .subscribe(move |msg| {
        if matches!(msg, FrameMsg::Ready(_)) {
          c_order.borrow_mut().push("frame");
        }
      })
      .unsubscribe_when_dropped();
    let c_order = order.clone();
    let _timer = host.delay(Duration::ZERO, Box::new(move || c_order.borrow_mut().push("timer")));

    host.draw_frame();
    assert_eq!(&*order.borrow(), &["timer", "frame"]);
  }

  #[test]
  fn clock_never_goes_back() {
    let start = Instant::now();
    let host = FrameHost::start_at(start + Duration::from_secs(1));
    host.advance_to(start);
    assert_eq!(host.now(), start + Duration::from_secs(1));
  }
}
