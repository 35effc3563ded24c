//! Boot sequence state machine.
//!
//! The dashboard opens with a scripted start-up: a dark pause, the arc
//! reactor powering on, a scrolling transcript with a biometric scan, a
//! "ready" hold and a launch transition. [`BootSequence`] models this as an
//! explicit state machine driven by elapsed time. Each stage's entry actions
//! come back from [`BootSequence::advance`] as [`BootEvent`]s for the host to
//! act on (mount a layer, play a cue, show a line).
//!
//! | Stage | Holds for | On entry |
//! |-------|-----------|----------|
//! | [`BootStage::Dark`] | 500 ms | nothing |
//! | [`BootStage::Reactor`] | 800 ms | show the reactor, speak the greeting |
//! | [`BootStage::Transcript`] | 80 ms per line, 100 ms per blank | first line |
//! | [`BootStage::Ready`] | 2 s | speak the ready message |
//! | [`BootStage::Launch`] | 1 s | nothing |
//! | [`BootStage::Complete`] | forever | [`BootEvent::Complete`] |
//!
//! The biometric scan starts with the script's scan line and then gains 2%
//! every 20 ms until it reaches 100%.

use log::debug;

pub const DARK_SECS: f32 = 0.5;
pub const REACTOR_SECS: f32 = 0.8;
pub const LINE_SECS: f32 = 0.08;
pub const BLANK_LINE_SECS: f32 = 0.1;
pub const READY_SECS: f32 = 2.0;
pub const LAUNCH_SECS: f32 = 1.0;
pub const SCAN_STEP_SECS: f32 = 0.02;
pub const SCAN_STEP_PERCENT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootStage {
    Dark,
    Reactor,
    Transcript,
    Ready,
    Launch,
    Complete,
}

/// Entry actions reported by [`BootSequence::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootEvent {
    StageEntered(BootStage),
    ShowReactor,
    /// A phrase to announce.
    Speak(String),
    /// A transcript line was appended.
    Line(String),
    ScanStarted,
    /// Scan progress in percent.
    ScanProgress(u8),
    Complete,
}

/// One transcript line and what to announce with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub text: String,
    pub speech: Option<String>,
}

impl ScriptLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speech: None,
        }
    }

    pub fn spoken(mut self, speech: impl Into<String>) -> Self {
        self.speech = Some(speech.into());
        self
    }

    fn delay(&self) -> f32 {
        if self.text.is_empty() {
            BLANK_LINE_SECS
        } else {
            LINE_SECS
        }
    }
}

/// The words of a boot sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootScript {
    pub greeting: String,
    pub lines: Vec<ScriptLine>,
    /// Index of the line that starts the biometric scan.
    pub scan_at: Option<usize>,
    pub scan_speech: String,
    pub ready_speech: String,
}

impl BootScript {
    /// The stock dashboard transcript addressed to `identity`.
    pub fn standard(identity: &str) -> Self {
        let lines = vec![
            ScriptLine::new("BOOT SEQUENCE INITIATED..."),
            ScriptLine::new("> POWER NODES: ONLINE"),
            ScriptLine::new("> GRID MATRIX: ACTIVE"),
            ScriptLine::new("> AI CORE: WAKING"),
            ScriptLine::new("> BIOSYNC LEVEL: 98%"),
            ScriptLine::new(""),
            ScriptLine::new("INITIALIZING B-HUD SYSTEM..."),
            ScriptLine::new("HOLOGRAPHIC USER DASHBOARD"),
            ScriptLine::new(format!("VERSION {}", env!("CARGO_PKG_VERSION"))),
            ScriptLine::new(""),
            ScriptLine::new("LOADING CORE MODULES..."),
            ScriptLine::new("> ARC REACTOR: ONLINE"),
            ScriptLine::new("> NEURAL INTERFACE: ACTIVE"),
            ScriptLine::new("> HOLOGRAPHIC PROJECTION: READY"),
            ScriptLine::new("> BIOMETRIC SCANNER: ONLINE"),
            ScriptLine::new(""),
            ScriptLine::new("SCANNING..."),
            ScriptLine::new("ANALYZING BIOMETRIC DATA..."),
            ScriptLine::new("CROSS-REFERENCING DATABASE..."),
            ScriptLine::new(""),
            ScriptLine::new("MATCH FOUND.").spoken("Match found. Identity confirmed."),
            ScriptLine::new(format!("IDENTITY: {}", identity)).spoken(format!("Welcome, {}", identity)),
            ScriptLine::new("STATUS: ONLINE"),
            ScriptLine::new(""),
            ScriptLine::new("BIOSYNC COMPLETE"),
            ScriptLine::new("CLEARANCE: ADMIN"),
            ScriptLine::new("ACCESS GRANTED"),
            ScriptLine::new(""),
            ScriptLine::new("ASSEMBLING INTERFACE PANELS..."),
            ScriptLine::new("> PARTICLE FIELDS: LOADED"),
            ScriptLine::new("> DATA STREAMS: READY"),
            ScriptLine::new(""),
            ScriptLine::new("B-HUD NEURAL INTERFACE READY").spoken("B-HUD neural interface ready"),
            ScriptLine::new("ALL SYSTEMS OPERATIONAL"),
            ScriptLine::new(""),
            ScriptLine::new("Welcome, Operator."),
        ];
        Self {
            greeting: "Boot sequence initiated".to_owned(),
            lines,
            scan_at: Some(10),
            scan_speech: "Scanning biometric data".to_owned(),
            ready_speech: "All systems operational".to_owned(),
        }
    }

    /// Seconds from start to [`BootStage::Complete`].
    pub fn duration(&self) -> f32 {
        let transcript: f32 = self.lines.iter().map(ScriptLine::delay).sum();
        DARK_SECS + REACTOR_SECS + transcript + READY_SECS + LAUNCH_SECS
    }
}

impl Default for BootScript {
    fn default() -> Self {
        Self::standard("OPERATOR")
    }
}

#[derive(Debug, Clone)]
pub struct BootSequence {
    script: BootScript,
    stage: BootStage,
    /// Seconds since the current step began.
    timer: f32,
    next_line: usize,
    transcript: Vec<String>,
    scan: Option<u8>,
    scan_timer: f32,
}

impl BootSequence {
    pub fn new(script: BootScript) -> Self {
        Self {
            script,
            stage: BootStage::Dark,
            timer: 0.0,
            next_line: 0,
            transcript: Vec::new(),
            scan: None,
            scan_timer: 0.0,
        }
    }

    pub fn stage(&self) -> BootStage {
        self.stage
    }

    pub fn is_complete(&self) -> bool {
        self.stage == BootStage::Complete
    }

    /// Lines shown so far.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn scan_progress(&self) -> Option<u8> {
        self.scan
    }

    /// Whether the reactor should be on screen.
    pub fn reactor_visible(&self) -> bool {
        self.stage >= BootStage::Reactor
    }

    /// Move time forward by `dt` seconds and collect every entry action that
    /// fell inside that span, in order.
    pub fn advance(&mut self, dt: f32) -> Vec<BootEvent> {
        let mut events = Vec::new();
        if self.is_complete() || !(dt > 0.0) {
            return events;
        }

        if self.scan.is_some() {
            self.scan_timer += dt;
        }
        self.timer += dt;

        while let Some(wait) = self.wait() {
            if self.timer < wait {
                break;
            }
            self.timer -= wait;
            self.step(&mut events);
        }

        if let Some(progress) = self.scan {
            let mut p = progress;
            while p < 100 && self.scan_timer >= SCAN_STEP_SECS {
                self.scan_timer -= SCAN_STEP_SECS;
                p = p.saturating_add(SCAN_STEP_PERCENT).min(100);
            }
            if p != progress {
                self.scan = Some(p);
                events.push(BootEvent::ScanProgress(p));
            }
        }

        events
    }

    /// Jump straight to [`BootStage::Complete`].
    pub fn skip(&mut self) -> Vec<BootEvent> {
        if self.is_complete() {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.enter(BootStage::Complete, &mut events);
        events
    }

    /// How long the current step holds, `None` once complete.
    fn wait(&self) -> Option<f32> {
        match self.stage {
            BootStage::Dark => Some(DARK_SECS),
            BootStage::Reactor => Some(REACTOR_SECS),
            BootStage::Transcript => Some(
                self.next_line
                    .checked_sub(1)
                    .and_then(|i| self.script.lines.get(i))
                    .map_or(0.0, ScriptLine::delay),
            ),
            BootStage::Ready => Some(READY_SECS),
            BootStage::Launch => Some(LAUNCH_SECS),
            BootStage::Complete => None,
        }
    }

    fn step(&mut self, events: &mut Vec<BootEvent>) {
        match self.stage {
            BootStage::Dark => self.enter(BootStage::Reactor, events),
            BootStage::Reactor => self.enter(BootStage::Transcript, events),
            BootStage::Transcript if self.next_line < self.script.lines.len() => {
                self.emit_line(events)
            }
            BootStage::Transcript => self.enter(BootStage::Ready, events),
            BootStage::Ready => self.enter(BootStage::Launch, events),
            BootStage::Launch => self.enter(BootStage::Complete, events),
            BootStage::Complete => {}
        }
    }

    fn enter(&mut self, stage: BootStage, events: &mut Vec<BootEvent>) {
        debug!("boot stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
        events.push(BootEvent::StageEntered(stage));
        match stage {
            BootStage::Reactor => {
                events.push(BootEvent::ShowReactor);
                events.push(BootEvent::Speak(self.script.greeting.clone()));
            }
            BootStage::Transcript => {
                if !self.script.lines.is_empty() {
                    self.emit_line(events);
                }
            }
            BootStage::Ready => {
                events.push(BootEvent::Speak(self.script.ready_speech.clone()));
            }
            BootStage::Complete => {
                events.push(BootEvent::Complete);
            }
            BootStage::Dark | BootStage::Launch => {}
        }
    }

    fn emit_line(&mut self, events: &mut Vec<BootEvent>) {
        let index = self.next_line;
        let Some(line) = self.script.lines.get(index) else {
            return;
        };
        self.next_line += 1;
        self.transcript.push(line.text.clone());
        events.push(BootEvent::Line(line.text.clone()));

        if self.script.scan_at == Some(index) {
            self.scan = Some(0);
            // Time already spent past this line counts toward the scan.
            self.scan_timer = self.timer;
            events.push(BootEvent::ScanStarted);
            events.push(BootEvent::Speak(self.script.scan_speech.clone()));
        }
        if let Some(speech) = &line.speech {
            events.push(BootEvent::Speak(speech.clone()));
        }
    }
}

impl Default for BootSequence {
    fn default() -> Self {
        Self::new(BootScript::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_script() -> BootScript {
        BootScript {
            greeting: "hello".into(),
            lines: vec![
                ScriptLine::new("A"),
                ScriptLine::new(""),
                ScriptLine::new("B").spoken("bee"),
            ],
            scan_at: Some(0),
            scan_speech: "scan".into(),
            ready_speech: "ready".into(),
        }
    }

    #[test]
    fn test_dark_then_reactor() {
        let mut boot = BootSequence::new(short_script());
        assert!(boot.advance(0.4).is_empty());
        assert_eq!(boot.stage(), BootStage::Dark);
        assert!(!boot.reactor_visible());

        let events = boot.advance(0.2);
        assert_eq!(
            events,
            vec![
                BootEvent::StageEntered(BootStage::Reactor),
                BootEvent::ShowReactor,
                BootEvent::Speak("hello".into()),
            ]
        );
        assert!(boot.reactor_visible());
    }

    #[test]
    fn test_transcript_timing() {
        let mut boot = BootSequence::new(short_script());
        boot.advance(DARK_SECS + REACTOR_SECS + 0.001);
        assert_eq!(boot.stage(), BootStage::Transcript);
        assert_eq!(boot.transcript(), ["A"]);

        // "A" holds 80 ms, the blank 100 ms
        boot.advance(0.08);
        assert_eq!(boot.transcript().len(), 2);
        boot.advance(0.05);
        assert_eq!(boot.transcript().len(), 2);
        let events = boot.advance(0.05);
        assert!(events.contains(&BootEvent::Line("B".into())));
        assert!(events.contains(&BootEvent::Speak("bee".into())));
    }

    #[test]
    fn test_scan_progress_saturates() {
        let mut boot = BootSequence::new(short_script());
        let events = boot.advance(DARK_SECS + REACTOR_SECS + 0.001);
        assert!(events.contains(&BootEvent::ScanStarted));
        assert_eq!(boot.scan_progress(), Some(0));

        boot.advance(0.1);
        assert_eq!(boot.scan_progress(), Some(10));
        boot.advance(5.0);
        assert_eq!(boot.scan_progress(), Some(100));
    }

    #[test]
    fn test_runs_to_completion_once() {
        let script = BootScript::default();
        let total = script.duration();
        let line_count = script.lines.len();
        let mut boot = BootSequence::new(script);

        let mut events = Vec::new();
        let mut t = 0.0;
        while t < total + 0.1 {
            events.extend(boot.advance(1.0 / 60.0));
            t += 1.0 / 60.0;
        }

        assert!(boot.is_complete());
        assert_eq!(boot.transcript().len(), line_count);
        assert_eq!(events.iter().filter(|e| **e == BootEvent::Complete).count(), 1);
        let stages: Vec<BootStage> = events
            .iter()
            .filter_map(|e| match e {
                BootEvent::StageEntered(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            [
                BootStage::Reactor,
                BootStage::Transcript,
                BootStage::Ready,
                BootStage::Launch,
                BootStage::Complete
            ]
        );
        assert!(boot.advance(1.0).is_empty());
    }

    #[test]
    fn test_not_complete_before_duration() {
        let script = short_script();
        let total = script.duration();
        let mut boot = BootSequence::new(script);
        boot.advance(total - 0.05);
        assert_eq!(boot.stage(), BootStage::Launch);
    }

    #[test]
    fn test_skip() {
        let mut boot = BootSequence::default();
        let events = boot.skip();
        assert_eq!(events.last(), Some(&BootEvent::Complete));
        assert!(boot.is_complete());
        assert!(boot.skip().is_empty());
    }

    #[test]
    fn test_standard_script_greets_identity() {
        let script = BootScript::standard("TONY");
        assert!(script
            .lines
            .iter()
            .any(|l| l.speech.as_deref() == Some("Welcome, TONY")));
        assert_eq!(script.lines[10].text, "LOADING CORE MODULES...");
    }
}
