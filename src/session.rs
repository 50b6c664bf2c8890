//! Input session: a single worker thread that owns every input channel and the
//! transport, fed by a FIFO command queue.
//!
//! Callers only enqueue commands. The worker applies them one at a time and sends
//! one frame per command, so a frame never carries a half-applied command.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Deserialize;

use crate::frame;
use crate::input::{Button, InputState, TOUCH_MAX};
use crate::transport::Transport;

/// Delay before the release frame of a oneshot press.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Which channel a delayed release resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseTarget {
    /// Release the pressed button.
    Buttons,
    /// Reset the touch screen and leave the button pressed. This is what existing peers see.
    #[default]
    Touch,
}

impl fmt::Display for ReleaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseTarget::Buttons => write!(f, "buttons"),
            ReleaseTarget::Touch => write!(f, "touch"),
        }
    }
}

impl FromStr for ReleaseTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buttons" | "button" => Ok(ReleaseTarget::Buttons),
            "touch" => Ok(ReleaseTarget::Touch),
            _ => Err(format!(
                "Invalid release target '{}'. Valid values: buttons, touch",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub release_target: ReleaseTarget,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            release_target: ReleaseTarget::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("touch {axis} coordinate {value} is out of range 0..=4095")]
    CoordinateOutOfRange { axis: char, value: u16 },

    #[error("input worker has stopped")]
    WorkerStopped,

    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    #[error("input worker panicked")]
    WorkerPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Press, send, wait out the debounce, release, send. Both frames belong to this entry.
    Oneshot(Button),
    Touch { x: u16, y: u16 },
    ClearTouch,
    Stop,
}

/// Cloneable producer side of a session. Safe to move to other threads.
///
/// Enqueueing only fails once the worker has exited. A command accepted after
/// [`InputSession::shutdown`] has queued its stop marker, but before the worker is gone,
/// is discarded with a warning.
#[derive(Clone)]
pub struct SessionHandle {
    tx: Sender<Command>,
}

impl SessionHandle {
    /// Press `button` for one frame; a release frame follows after the debounce delay.
    pub fn press_button_oneshot(&self, button: Button) -> Result<(), SessionError> {
        self.enqueue(Command::Oneshot(button))
    }

    pub fn begin_touch(&self, x: u16, y: u16) -> Result<(), SessionError> {
        check_coordinate('x', x)?;
        check_coordinate('y', y)?;
        self.enqueue(Command::Touch { x, y })
    }

    pub fn end_touch(&self) -> Result<(), SessionError> {
        self.enqueue(Command::ClearTouch)
    }

    fn enqueue(&self, command: Command) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::WorkerStopped)
    }
}

fn check_coordinate(axis: char, value: u16) -> Result<(), SessionError> {
    if value > TOUCH_MAX {
        return Err(SessionError::CoordinateOutOfRange { axis, value });
    }
    Ok(())
}

/// Owner of the worker thread. Shut it down explicitly with [`InputSession::shutdown`];
/// dropping it does the same and logs any failure.
pub struct InputSession {
    handle: SessionHandle,
    worker: Option<JoinHandle<Result<u64, SessionError>>>,
}

impl InputSession {
    pub fn spawn<T: Transport>(transport: T, settings: SessionSettings) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("input-worker".into())
            .spawn(move || Worker::new(rx, transport, settings).run())?;

        Ok(Self {
            handle: SessionHandle { tx },
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn press_button_oneshot(&self, button: Button) -> Result<(), SessionError> {
        self.handle.press_button_oneshot(button)
    }

    pub fn begin_touch(&self, x: u16, y: u16) -> Result<(), SessionError> {
        self.handle.begin_touch(x, y)
    }

    pub fn end_touch(&self) -> Result<(), SessionError> {
        self.handle.end_touch()
    }

    /// Let the worker drain everything queued so far, then stop it.
    /// Returns the number of frames sent, or the error that stopped the worker.
    pub fn shutdown(mut self) -> Result<u64, SessionError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<u64, SessionError> {
        let Some(worker) = self.worker.take() else {
            return Ok(0);
        };
        // A failed send means the worker already exited; join reports why.
        let _ = self.handle.tx.send(Command::Stop);
        worker.join().unwrap_or(Err(SessionError::WorkerPanicked))
    }
}

impl Drop for InputSession {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                log::warn!("Input worker stopped with error: {}", e);
            }
        }
    }
}

struct Worker<T: Transport> {
    rx: Receiver<Command>,
    transport: T,
    state: InputState,
    settings: SessionSettings,
    frames_sent: u64,
}

impl<T: Transport> Worker<T> {
    fn new(rx: Receiver<Command>, transport: T, settings: SessionSettings) -> Self {
        Self {
            rx,
            transport,
            state: InputState::new(),
            settings,
            frames_sent: 0,
        }
    }

    fn run(mut self) -> Result<u64, SessionError> {
        log::info!(
            "Input worker started (debounce {}ms, release target {})",
            self.settings.debounce.as_millis(),
            self.settings.release_target
        );

        while let Ok(command) = self.rx.recv() {
            if command == Command::Stop {
                self.discard_pending();
                break;
            }
            log::debug!("Applying {:?}", command);
            self.execute(command)?;
        }

        log::info!("Input worker stopped after {} frames", self.frames_sent);
        Ok(self.frames_sent)
    }

    fn execute(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::ClearTouch => self.state.touch.reset(),
            Command::Touch { x, y } => {
                self.state.touch.reset();
                self.state.touch.set(x, y);
            }
            Command::Oneshot(button) => {
                self.state.buttons.reset();
                self.state.buttons.set(button, true);
                self.send()?;

                thread::sleep(self.settings.debounce);
                match self.settings.release_target {
                    ReleaseTarget::Buttons => self.state.buttons.reset(),
                    ReleaseTarget::Touch => self.state.touch.reset(),
                }
            }
            Command::Stop => return Ok(()),
        }
        self.send()
    }

    /// Drop whatever raced in behind the stop marker.
    fn discard_pending(&mut self) {
        let discarded = self
            .rx
            .try_iter()
            .filter(|command| *command != Command::Stop)
            .count();
        if discarded > 0 {
            log::warn!("Discarding {} commands queued after shutdown", discarded);
        }
    }

    fn send(&mut self) -> Result<(), SessionError> {
        let frame = self.state.frame();
        log::trace!("Sending frame {}", frame::to_hex(&frame));
        if let Err(e) = self.transport.send_frame(&frame) {
            log::error!("Send failed, input delivery stopped: {}", e);
            return Err(SessionError::Transport(e));
        }
        self.frames_sent += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, FrameFields};
    use crate::input::{HidButtons, TOUCH_NEUTRAL};
    use std::time::Instant;

    const NEUTRAL_BUTTONS: u32 = 0x0000_0FFF;
    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    struct Recorder {
        tx: Sender<(Instant, Frame)>,
    }

    impl Transport for Recorder {
        fn send_frame(&mut self, frame: &Frame) -> io::Result<()> {
            let _ = self.tx.send((Instant::now(), *frame));
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn send_frame(&mut self, _frame: &Frame) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "peer unreachable"))
        }
    }

    fn recording_session(settings: SessionSettings) -> (InputSession, Receiver<(Instant, Frame)>) {
        let (tx, rx) = mpsc::channel();
        let session = InputSession::spawn(Recorder { tx }, settings).unwrap();
        (session, rx)
    }

    fn fast_settings() -> SessionSettings {
        SessionSettings {
            debounce: Duration::from_millis(10),
            ..SessionSettings::default()
        }
    }

    fn next_fields(rx: &Receiver<(Instant, Frame)>) -> (Instant, FrameFields) {
        let (at, frame) = rx.recv_timeout(RECV_TIMEOUT).unwrap();
        (at, FrameFields::parse(&frame).unwrap())
    }

    fn pressed(button: Button) -> u32 {
        NEUTRAL_BUTTONS & !button.flag().bits()
    }

    fn collect(rx: &Receiver<(Instant, Frame)>) -> Vec<(Instant, FrameFields)> {
        rx.try_iter()
            .map(|(at, f)| (at, FrameFields::parse(&f).unwrap()))
            .collect()
    }

    fn touching(x: u32, y: u32) -> u32 {
        x | (y << 12) | (1 << 24)
    }

    #[test]
    fn test_oneshot_press_releases_after_debounce() {
        let (session, rx) = recording_session(SessionSettings::default());
        session.press_button_oneshot(Button::A).unwrap();

        let (first_at, first) = next_fields(&rx);
        let (second_at, second) = next_fields(&rx);
        assert_eq!(first.buttons, pressed(Button::A));
        assert_eq!(second.touch, TOUCH_NEUTRAL);
        assert_eq!(second.buttons, pressed(Button::A));
        assert!(second_at.duration_since(first_at) >= DEFAULT_DEBOUNCE);

        assert_eq!(session.shutdown().unwrap(), 2);
    }

    #[test]
    fn test_default_release_resets_touch() {
        let (session, rx) = recording_session(SessionSettings::default());
        session.begin_touch(100, 200).unwrap();
        session.press_button_oneshot(Button::A).unwrap();
        assert_eq!(session.shutdown().unwrap(), 3);

        let frames = collect(&rx);
        assert_eq!(frames[1].1.touch, touching(100, 200));
        assert_eq!(frames[1].1.buttons, pressed(Button::A));
        assert_eq!(frames[2].1.touch, TOUCH_NEUTRAL);
    }

    #[test]
    fn test_command_sequence_in_order() {
        let (session, rx) = recording_session(fast_settings());
        session.begin_touch(10, 20).unwrap();
        session.press_button_oneshot(Button::B).unwrap();
        session.end_touch().unwrap();
        assert_eq!(session.shutdown().unwrap(), 4);

        let frames: Vec<FrameFields> = collect(&rx).into_iter().map(|(_, f)| f).collect();
        assert_eq!(frames.len(), 4);

        assert_eq!(frames[0].touch, touching(10, 20));
        assert_eq!(frames[0].buttons, NEUTRAL_BUTTONS);
        assert_eq!(frames[1].touch, touching(10, 20));
        assert_eq!(frames[1].buttons, pressed(Button::B));
        assert_eq!(frames[2].touch, TOUCH_NEUTRAL);
        assert_eq!(frames[3].touch, TOUCH_NEUTRAL);
        assert_eq!(frames[3].buttons, pressed(Button::B));
    }

    #[test]
    fn test_concurrent_producers_keep_fifo_per_producer() {
        const PRODUCERS: u16 = 4;
        const PER_PRODUCER: u16 = 50;

        let (session, rx) = recording_session(fast_settings());
        let threads: Vec<_> = (0..PRODUCERS)
            .map(|id| {
                let handle = session.handle();
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        handle.begin_touch(id, seq).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(session.shutdown().unwrap(), u64::from(PRODUCERS * PER_PRODUCER));

        let mut last_seq: Vec<Option<u32>> = vec![None; PRODUCERS as usize];
        let mut count = 0;
        for (_, fields) in collect(&rx) {
            assert_eq!(fields.touch >> 24, 1, "every frame is a complete touch");
            let id = (fields.touch & 0xFFF) as usize;
            let seq = (fields.touch >> 12) & 0xFFF;
            if let Some(prev) = last_seq[id] {
                assert_eq!(seq, prev + 1, "producer {} reordered", id);
            }
            last_seq[id] = Some(seq);
            count += 1;
        }
        assert_eq!(count, PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn test_oneshot_not_split_by_concurrent_producer() {
        const ROUNDS: u16 = 20;
        const TOUCHES: u16 = 100;

        let (session, rx) = recording_session(SessionSettings {
            debounce: Duration::from_millis(1),
            release_target: ReleaseTarget::Buttons,
        });

        let mixed = session.handle();
        let mixed = thread::spawn(move || {
            for seq in 0..ROUNDS {
                mixed.begin_touch(1, seq).unwrap();
                mixed.press_button_oneshot(Button::B).unwrap();
                mixed.end_touch().unwrap();
            }
        });
        let toucher = session.handle();
        let toucher = thread::spawn(move || {
            for seq in 0..TOUCHES {
                toucher.begin_touch(2, seq).unwrap();
            }
        });
        mixed.join().unwrap();
        toucher.join().unwrap();

        let expected = u64::from(ROUNDS * 4 + TOUCHES);
        assert_eq!(session.shutdown().unwrap(), expected);

        let frames: Vec<FrameFields> = collect(&rx).into_iter().map(|(_, f)| f).collect();
        assert_eq!(frames.len() as u64, expected);

        let mut presses = 0;
        let mut last_seq = [None::<u32>; 3];
        for (i, frame) in frames.iter().enumerate() {
            if frame.buttons == pressed(Button::B) {
                presses += 1;
                let release = &frames[i + 1];
                assert_eq!(release.buttons, NEUTRAL_BUTTONS, "frame {} not followed by its release", i);
                assert_eq!(release.touch, frame.touch, "another command landed inside the oneshot");
            } else {
                assert_eq!(frame.buttons, NEUTRAL_BUTTONS);
            }
            if frame.touch >> 24 == 1 && (i == 0 || frames[i - 1].touch != frame.touch) {
                let id = (frame.touch & 0xFFF) as usize;
                let seq = (frame.touch >> 12) & 0xFFF;
                if let Some(prev) = last_seq[id] {
                    assert_eq!(seq, prev + 1, "producer {} reordered", id);
                }
                last_seq[id] = Some(seq);
            }
        }
        assert_eq!(presses, ROUNDS);
    }

    #[test]
    fn test_commands_during_debounce_are_delayed_not_dropped() {
        let debounce = Duration::from_millis(100);
        let (session, rx) = recording_session(SessionSettings {
            debounce,
            ..SessionSettings::default()
        });
        session.press_button_oneshot(Button::X).unwrap();
        session.begin_touch(1, 2).unwrap();
        assert_eq!(session.shutdown().unwrap(), 3);

        let frames = collect(&rx);
        assert_eq!(frames[0].1.buttons, pressed(Button::X));
        assert_eq!(frames[1].1.touch, TOUCH_NEUTRAL);
        assert_eq!(frames[2].1.touch, touching(1, 2));
        assert!(frames[2].0.duration_since(frames[0].0) >= debounce);
    }

    #[test]
    fn test_release_target_buttons_resets_buttons_only() {
        let (session, rx) = recording_session(SessionSettings {
            debounce: Duration::from_millis(10),
            release_target: ReleaseTarget::Buttons,
        });
        session.begin_touch(300, 400).unwrap();
        session.press_button_oneshot(Button::Y).unwrap();
        assert_eq!(session.shutdown().unwrap(), 3);

        let frames: Vec<FrameFields> = collect(&rx).into_iter().map(|(_, f)| f).collect();
        assert_eq!(frames[1].buttons, pressed(Button::Y));
        assert_eq!(frames[2].buttons, NEUTRAL_BUTTONS);
        assert_eq!(frames[2].touch, touching(300, 400));
    }

    #[test]
    fn test_button_press_replaces_previous_button() {
        let (session, rx) = recording_session(fast_settings());
        session.press_button_oneshot(Button::L).unwrap();
        session.press_button_oneshot(Button::R).unwrap();
        assert_eq!(session.shutdown().unwrap(), 4);

        let frames: Vec<FrameFields> = collect(&rx).into_iter().map(|(_, f)| f).collect();
        assert_eq!(frames[2].buttons, NEUTRAL_BUTTONS & !HidButtons::R.bits());
    }

    #[test]
    fn test_commands_behind_stop_are_discarded() {
        let (session, rx) = recording_session(SessionSettings {
            debounce: Duration::from_millis(100),
            ..SessionSettings::default()
        });
        let handle = session.handle();
        handle.press_button_oneshot(Button::A).unwrap();
        handle.tx.send(Command::Stop).unwrap();
        // accepted: the worker is still inside the debounce
        handle.begin_touch(5, 5).unwrap();
        assert_eq!(session.shutdown().unwrap(), 2);

        assert!(collect(&rx)
            .iter()
            .all(|(_, f)| f.touch == TOUCH_NEUTRAL));
    }

    #[test]
    fn test_end_touch_twice_sends_two_neutral_frames() {
        let (session, rx) = recording_session(fast_settings());
        session.end_touch().unwrap();
        session.end_touch().unwrap();
        assert_eq!(session.shutdown().unwrap(), 2);

        let touches: Vec<u32> = rx
            .try_iter()
            .map(|(_, f)| FrameFields::parse(&f).unwrap().touch)
            .collect();
        assert_eq!(touches, vec![TOUCH_NEUTRAL, TOUCH_NEUTRAL]);
    }

    #[test]
    fn test_out_of_range_touch_rejected() {
        let (session, _rx) = recording_session(fast_settings());
        assert!(matches!(
            session.begin_touch(4096, 0),
            Err(SessionError::CoordinateOutOfRange { axis: 'x', value: 4096 })
        ));
        assert!(matches!(
            session.begin_touch(0, u16::MAX),
            Err(SessionError::CoordinateOutOfRange { axis: 'y', .. })
        ));
        session.begin_touch(4095, 4095).unwrap();
        assert_eq!(session.shutdown().unwrap(), 1);
    }

    #[test]
    fn test_transport_failure_stops_worker() {
        let session = InputSession::spawn(Broken, fast_settings()).unwrap();
        let handle = session.handle();
        session.end_touch().unwrap();
        let err = session.shutdown().unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "peer unreachable");
        assert!(matches!(handle.end_touch(), Err(SessionError::WorkerStopped)));
    }

    #[test]
    fn test_handle_after_shutdown() {
        let (session, _rx) = recording_session(fast_settings());
        let handle = session.handle();
        session.shutdown().unwrap();
        assert!(matches!(
            handle.press_button_oneshot(Button::Start),
            Err(SessionError::WorkerStopped)
        ));
    }

    #[test]
    fn test_release_target_from_str() {
        assert_eq!("touch".parse::<ReleaseTarget>().unwrap(), ReleaseTarget::Touch);
        assert_eq!("Buttons".parse::<ReleaseTarget>().unwrap(), ReleaseTarget::Buttons);
        assert!("stick".parse::<ReleaseTarget>().is_err());
    }
}
