//! Audible cues for timer starts and ends.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::events::SessionEvent;

/// Receives the two cues a training session produces
pub trait SoundSink {
    fn timer_started(&self);
    fn timer_ended(&self);
}

/// Plays the cues that belong to `events`
pub fn play_for_events<S: SoundSink + ?Sized>(sink: &S, events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::TimerStarted => sink.timer_started(),
            SessionEvent::TimerEnded => sink.timer_ended(),
            _ => {}
        }
    }
}

/// Shells out to the desktop sound player on a detached thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSound;

const START_SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/message.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/prompt.wav"),
];

const END_SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

impl SystemSound {
    fn play(candidates: &'static [(&'static str, &'static str)]) {
        std::thread::spawn(move || {
            let found = candidates
                .iter()
                .find(|(_, file)| Path::new(file).exists());
            let Some((cmd, file)) = found else {
                log::debug!("no sound file available");
                return;
            };
            match run_player(cmd, file) {
                Ok(status) if !status.success() => log::debug!("{cmd} exited with {status}"),
                Ok(_) => {}
                Err(e) => log::warn!("could not run {cmd}: {e}"),
            }
        });
    }
}

/// Runs the player to completion so its process is reaped
fn run_player(cmd: &str, file: &str) -> io::Result<ExitStatus> {
    Command::new(cmd)
        .arg(file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
}

impl SoundSink for SystemSound {
    fn timer_started(&self) {
        Self::play(START_SOUNDS);
    }

    fn timer_ended(&self) {
        Self::play(END_SOUNDS);
    }
}

/// Rings the terminal bell when a timer runs out
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl SoundSink for TerminalBell {
    fn timer_started(&self) {}

    fn timer_ended(&self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundSink for Silent {
    fn timer_started(&self) {}
    fn timer_ended(&self) {}
}
