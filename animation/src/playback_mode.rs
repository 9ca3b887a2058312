use crate::timeline::Timeline;

/// The declarative instruction of how the timeline should play.
///
/// A mode is applied every time it is supplied, even if it equals the previous
/// one. Supplying `RestartForward` again replays the animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackMode {
  /// Stop at the current progress.
  Paused,
  /// Play toward the end from the current progress.
  #[default]
  PlayForward,
  /// Play toward the start from the current progress.
  PlayReverse,
  /// Play from the start toward the end.
  RestartForward,
  /// Play from the end toward the start.
  RestartReverse,
  /// Play toward the end and start over, endlessly.
  Loop,
  /// Play toward the end then back to the start, endlessly.
  Mirror,
}

impl PlaybackMode {
  /// Issue the timeline operation of this mode.
  pub fn apply(self, timeline: &Timeline) {
    log::trace!("apply playback mode {self:?} at progress {}", timeline.progress());
    match self {
      PlaybackMode::Paused => timeline.stop(false),
      PlaybackMode::PlayForward => timeline.forward(None),
      PlaybackMode::PlayReverse => timeline.reverse(None),
      PlaybackMode::RestartForward => timeline.forward(Some(0.)),
      PlaybackMode::RestartReverse => timeline.reverse(Some(1.)),
      PlaybackMode::Loop => {
        if !timeline.is_running_forward() {
          timeline.set_progress(0.);
        }
        timeline.repeat(false)
      }
      PlaybackMode::Mirror => timeline.repeat(true),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::{Duration, Instant};

  use super::*;
  use crate::status::{AnimationStatus, Direction};

  fn running_timeline(progress: f32, direction: Direction) -> Timeline {
    let timeline = Timeline::with_progress(Duration::from_secs(1), progress);
    match direction {
      Direction::Forward => timeline.forward(None),
      Direction::Reverse => timeline.reverse(None),
    }
    timeline
  }

  #[test]
  fn paused_keeps_progress() {
    let timeline = running_timeline(0.4, Direction::Forward);
    PlaybackMode::Paused.apply(&timeline);
    assert!(!timeline.is_running());
    assert_eq!(timeline.progress(), 0.4);
    assert_eq!(timeline.status(), AnimationStatus::Idle);
  }

  #[test]
  fn play_from_current() {
    let timeline = running_timeline(0.4, Direction::Forward);
    PlaybackMode::PlayReverse.apply(&timeline);
    assert_eq!(timeline.progress(), 0.4);
    assert_eq!(timeline.status(), AnimationStatus::Reverse);

    PlaybackMode::PlayForward.apply(&timeline);
    assert_eq!(timeline.progress(), 0.4);
    assert_eq!(timeline.status(), AnimationStatus::Forward);
  }

  #[test]
  fn restart_forward_while_reversing() {
    let timeline = running_timeline(0.7, Direction::Reverse);
    PlaybackMode::RestartForward.apply(&timeline);
    assert_eq!(timeline.progress(), 0.);
    assert!(timeline.is_running_forward());
  }

  #[test]
  fn restart_reverse() {
    let timeline = running_timeline(0.2, Direction::Forward);
    PlaybackMode::RestartReverse.apply(&timeline);
    assert_eq!(timeline.progress(), 1.);
    assert_eq!(timeline.status(), AnimationStatus::Reverse);
  }

  #[test]
  fn loop_resets_unless_running_forward() {
    let timeline = running_timeline(0.6, Direction::Reverse);
    PlaybackMode::Loop.apply(&timeline);
    assert_eq!(timeline.progress(), 0.);
    assert!(timeline.is_running_forward());

    let start = Instant::now();
    timeline.tick(start);
    timeline.tick(start + Duration::from_millis(500));
    PlaybackMode::Loop.apply(&timeline);
    assert_eq!(timeline.progress(), 0.5);
  }

  #[test]
  fn mirror_heads_to_end() {
    let timeline = running_timeline(0.6, Direction::Reverse);
    PlaybackMode::Mirror.apply(&timeline);
    assert_eq!(timeline.progress(), 0.6);
    assert!(timeline.is_running_forward());
  }
}
