use std::{convert::Infallible, time::Instant};

use rxrust::prelude::*;

/// Broadcast the frame messages of a host to every timeline.
///
/// Cloning a `FrameTicker` shares the same subject.
#[derive(Default, Clone)]
pub struct FrameTicker {
  subject: Subject<'static, FrameMsg, Infallible>,
}

/// What a frame is doing when the message is broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameMsg {
  /// This msg emit when the host is ready to draw a new frame at the instant.
  /// Timelines advance their progress on it.
  Ready(Instant),
  /// This msg emit after every listener processed the `Ready` message of
  /// the current frame.
  Finish,
}

impl FrameTicker {
  #[inline]
  pub fn emit(&self, msg: FrameMsg) { self.subject.clone().next(msg) }

  #[inline]
  pub fn frame_tick_stream(&self) -> ops::box_it::BoxOp<'static, FrameMsg, Infallible> {
    self.subject.clone().box_it()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[test]
  fn clones_share_subject() {
    let ticker = FrameTicker::default();
    let msgs = Rc::new(RefCell::new(vec![]));
    let c_msgs = msgs.clone();
    let u = ticker
      .clone()
      .frame_tick_stream()
      .subscribe(move |msg| c_msgs.borrow_mut().push(msg));

    let now = Instant::now();
    ticker.emit(FrameMsg::Ready(now));
    ticker.emit(FrameMsg::Finish);
    assert_eq!(&*msgs.borrow(), &[FrameMsg::Ready(now), FrameMsg::Finish]);

    u.unsubscribe();
    ticker.emit(FrameMsg::Finish);
    assert_eq!(msgs.borrow().len(), 2);
  }
}
