//! Key-script replay against one editing session.
//!
//! The engine never touches the system clipboard; copy and cut hand text
//! back in `DispatchResult::clipboard`. The replay keeps that text locally
//! and serves it to the action+`v` chord so scripts can round-trip it.
//!
//! Every text change restarts the syntax-check quiet window; the loaded
//! document itself counts as the first change.

use anyhow::{Context, Result};
use core_actions::CursorController;
use core_events::{Key, KeyEvent, parse_key, split_keys};
use core_state::{EditorSession, SyntaxCheckSchedule, SyntaxChecker, SyntaxReport};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub keys: usize,
    pub edits: usize,
}

pub struct Replay {
    pub session: EditorSession,
    pub controller: CursorController,
    syntax: SyntaxCheckSchedule,
    clipboard: Option<String>,
}

impl Replay {
    pub fn new(
        session: EditorSession,
        controller: CursorController,
        mut syntax: SyntaxCheckSchedule,
    ) -> Self {
        syntax.note_change(session.revision());
        Self {
            session,
            controller,
            syntax,
            clipboard: None,
        }
    }

    pub fn syntax(&self) -> &SyntaxCheckSchedule {
        &self.syntax
    }

    /// Run `checker` if the quiet window has elapsed. Returns the report
    /// when one was applied.
    pub fn check_due(&mut self, checker: &mut dyn SyntaxChecker) -> Option<&SyntaxReport> {
        if self.syntax.run_due(checker, &self.session) {
            self.syntax.report()
        } else {
            None
        }
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Parse `script` completely, then feed each key. A malformed key aborts
    /// before anything is applied.
    pub fn run(&mut self, script: &str) -> Result<ReplayStats> {
        let events = split_keys(script)
            .into_iter()
            .map(|spec| parse_key(spec).with_context(|| format!("invalid key {spec:?} in script")))
            .collect::<Result<Vec<_>>>()?;

        let mut stats = ReplayStats::default();
        for event in events {
            stats.keys += 1;
            if self.press(event) {
                stats.edits += 1;
            }
        }
        debug!(target: "runtime", keys = stats.keys, edits = stats.edits, revision = self.session.revision(), "script_replayed");
        Ok(stats)
    }

    /// Apply one key; returns true when the text changed.
    pub fn press(&mut self, event: KeyEvent) -> bool {
        if let Key::Char(c) = event.key
            && c.eq_ignore_ascii_case(&'v')
            && self.controller.platform().has_action_key(event.mods)
        {
            let Some(text) = self.clipboard.clone() else {
                return false;
            };
            let result = self.controller.paste_text(&mut self.session, &text);
            return self.note(result.text_changed);
        }
        let result = self.controller.handle_key(&mut self.session, event);
        if let Some(text) = result.clipboard {
            self.clipboard = Some(text);
        }
        self.note(result.text_changed)
    }

    fn note(&mut self, text_changed: bool) -> bool {
        if text_changed {
            self.syntax.note_change(self.session.revision());
        }
        text_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Platform;
    use core_state::syntax::DEFAULT_SYNTAX_DEBOUNCE;
    use core_state::{ManualClock, SyntaxCheckError};
    use core_text::MonospaceMeasure;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::time::Duration;

    fn replay_with_clock(text: &str, platform: Platform, clock: ManualClock) -> Replay {
        let measure = Box::new(MonospaceMeasure::default());
        let controller = CursorController::new(Default::default(), measure, platform);
        let syntax = SyntaxCheckSchedule::new(DEFAULT_SYNTAX_DEBOUNCE, Box::new(clock));
        Replay::new(EditorSession::from_text(text), controller, syntax)
    }

    fn replay(text: &str, platform: Platform) -> Replay {
        replay_with_clock(text, platform, ManualClock::new())
    }

    /// Reports an error whenever the text contains `bad`.
    #[derive(Default)]
    struct Keyword {
        seen: Vec<String>,
    }

    impl SyntaxChecker for Keyword {
        fn check(
            &mut self,
            text: &str,
            _path: Option<&Path>,
        ) -> Result<SyntaxReport, SyntaxCheckError> {
            self.seen.push(text.to_string());
            if text.contains("bad") {
                Ok(SyntaxReport::Error {
                    line: Some(0),
                    offset: None,
                    message: "bad token".to_string(),
                })
            } else {
                Ok(SyntaxReport::Success)
            }
        }
    }

    #[test]
    fn types_and_indents() {
        let mut r = replay("", Platform::Other);
        let stats = r.run("main:<CR><Tab>jr $ra").unwrap();
        assert_eq!(r.session.buffer.to_text(), "main:\n    jr $ra");
        assert_eq!(stats.keys, 13);
        assert_eq!(stats.edits, 13);
    }

    #[test]
    fn cut_then_paste_moves_text() {
        let mut r = replay("nop", Platform::Other);
        r.run("<C-a><C-x>").unwrap();
        assert_eq!(r.session.buffer.to_text(), "");
        assert_eq!(r.clipboard(), Some("nop"));
        r.run("<C-v><C-v>").unwrap();
        assert_eq!(r.session.buffer.to_text(), "nopnop");
    }

    #[test]
    fn paste_without_clipboard_is_noop() {
        let mut r = replay("x", Platform::Other);
        let stats = r.run("<C-v>").unwrap();
        assert_eq!(stats.edits, 0);
        assert_eq!(r.session.buffer.to_text(), "x");
    }

    #[test]
    fn action_key_follows_platform() {
        let mut mac = replay("a", Platform::Mac);
        mac.run("<C-a>").unwrap();
        assert!(!mac.session.cursor.has_selection());
        mac.run("<D-a>").unwrap();
        assert!(mac.session.cursor.has_selection());
    }

    #[test]
    fn bad_key_applies_nothing() {
        let mut r = replay("", Platform::Other);
        let err = r.run("ab<Bogus>").unwrap_err();
        assert!(err.to_string().contains("<Bogus>"));
        assert_eq!(r.session.buffer.to_text(), "");
    }

    #[test]
    fn loaded_document_is_checked_after_quiet_window() {
        let clock = ManualClock::new();
        let mut r = replay_with_clock("nop", Platform::Other, clock.clone());
        let mut checker = Keyword::default();
        assert!(r.check_due(&mut checker).is_none());
        clock.advance(DEFAULT_SYNTAX_DEBOUNCE);
        assert_eq!(r.check_due(&mut checker), Some(&SyntaxReport::Success));
        assert_eq!(checker.seen, vec!["nop"]);
    }

    #[test]
    fn edits_restart_quiet_window() {
        let clock = ManualClock::new();
        let mut r = replay_with_clock("", Platform::Other, clock.clone());
        let mut checker = Keyword::default();
        clock.advance(Duration::from_millis(400));
        r.run("ba").unwrap();
        clock.advance(Duration::from_millis(400));
        r.run("d").unwrap();
        clock.advance(Duration::from_millis(400));
        assert!(r.check_due(&mut checker).is_none());
        assert!(checker.seen.is_empty());

        clock.advance(Duration::from_millis(100));
        let report = r.check_due(&mut checker).cloned();
        assert!(matches!(report, Some(SyntaxReport::Error { line: Some(0), .. })));
        assert_eq!(checker.seen, vec!["bad"]);
    }

    #[test]
    fn motion_does_not_reschedule() {
        let clock = ManualClock::new();
        let mut r = replay_with_clock("abc", Platform::Other, clock.clone());
        let deadline = r.syntax().deadline();
        clock.advance(Duration::from_millis(200));
        r.run("<Right><Left><C-c>").unwrap();
        assert_eq!(r.syntax().deadline(), deadline);
    }
}
