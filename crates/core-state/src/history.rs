//! Coalescing undo/redo history.
//!
//! Edits are recorded *before* they happen as reversible `Operation`s. The
//! newest operation stays pending and keeps absorbing follow-up edits through
//! `merge` until it is flushed to the committed list, either by an explicit
//! `commit`, by the debounce deadline expiring, or by exceeding the
//! uncommitted-edit threshold. Committed entries beyond the backlog are
//! discarded oldest first.
//!
//! Redo uses its own stack: every undo records the inverse operation together
//! with the cursor at undo time, and any new push clears it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use core_text::{LineBuffer, SelectionIndex};
use tracing::trace;

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_BACKLOG: usize = 50;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);
pub const DEFAULT_COMMIT_INTERVAL: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum committed steps retained.
    pub backlog: usize,
    /// Inactivity window after which the pending step is committed.
    pub debounce: Duration,
    /// Pending edits tolerated before an immediate commit.
    pub commit_interval: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backlog: DEFAULT_BACKLOG,
            debounce: DEFAULT_DEBOUNCE,
            commit_interval: DEFAULT_COMMIT_INTERVAL,
        }
    }
}

/// Line-range delta: undo removes `replaced` lines at `index` and puts
/// `deleted` back in their place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceFrame {
    pub index: usize,
    pub deleted: Vec<String>,
    pub replaced: usize,
}

impl ReplaceFrame {
    fn last_end(&self) -> usize {
        self.index + self.replaced
    }
    fn next_end(&self) -> usize {
        self.index + self.deleted.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Snapshot of every line at capture time.
    Full(Vec<String>),
    Replace(ReplaceFrame),
}

impl Operation {
    /// Lines as they were before the recorded edit, given the lines after it.
    pub fn undo(&self, data: &[String]) -> Vec<String> {
        self.clone().apply(data.to_vec()).0
    }

    /// Apply this operation to `data`, returning the result and the inverse
    /// operation that maps the result back to `data`.
    fn apply(self, mut data: Vec<String>) -> (Vec<String>, Operation) {
        match self {
            Operation::Full(lines) => (lines, Operation::Full(data)),
            Operation::Replace(frame) => {
                let start = frame.index.min(data.len());
                let end = (frame.index + frame.replaced).min(data.len());
                let restored = frame.deleted.len();
                let removed: Vec<String> = data.splice(start..end, frame.deleted).collect();
                let inverse = ReplaceFrame {
                    index: start,
                    deleted: removed,
                    replaced: restored,
                };
                (data, Operation::Replace(inverse))
            }
        }
    }
}

/// An operation plus the cursor to restore once it is undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub operation: Operation,
    pub cursor: SelectionIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Operation that could not be combined and must be committed first.
    pub commit: Option<Operation>,
    pub merged: Operation,
}

/// Lines and cursor produced by an undo or redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restore {
    pub lines: Vec<String>,
    pub cursor: SelectionIndex,
}

fn collides(s1: usize, e1: usize, s2: usize, e2: usize) -> bool {
    s1 <= e2 && s2 <= e1
}

fn merge_replaces(last: ReplaceFrame, next: ReplaceFrame) -> MergeResult {
    let (last_start, last_end) = (last.index, last.last_end());
    let (next_start, next_end) = (next.index, next.next_end());

    // Typing over the same lines again.
    if last_start == next_start && last.replaced == next.deleted.len() {
        let merged = ReplaceFrame {
            replaced: next.replaced,
            ..last
        };
        return MergeResult {
            commit: None,
            merged: Operation::Replace(merged),
        };
    }

    if !collides(last_start, last_end, next_start, next_end) {
        return MergeResult {
            commit: Some(Operation::Replace(last)),
            merged: Operation::Replace(next),
        };
    }

    let leading_size = last.index.saturating_sub(next.index);
    let colliding_size = last_end.min(next_end).saturating_sub(last_start.max(next_start));
    let split = leading_size.min(next.deleted.len());
    let resume = (leading_size + colliding_size).min(next.deleted.len());

    let mut deleted = Vec::with_capacity(split + last.deleted.len() + next.deleted.len() - resume);
    deleted.extend_from_slice(&next.deleted[..split]);
    deleted.extend(last.deleted);
    deleted.extend_from_slice(&next.deleted[resume..]);

    MergeResult {
        commit: None,
        merged: Operation::Replace(ReplaceFrame {
            index: last.index.min(next.index),
            deleted,
            replaced: last.replaced + next.replaced - colliding_size,
        }),
    }
}

/// Combine the pending operation `last` with a newer operation `next` so a
/// single undo restores the state before both.
pub fn merge(last: Operation, next: Operation) -> MergeResult {
    match (last, next) {
        (last @ Operation::Full(_), _) => MergeResult {
            commit: None,
            merged: last,
        },
        (Operation::Replace(last), Operation::Full(lines)) => {
            let lines = Operation::Replace(last).undo(&lines);
            MergeResult {
                commit: None,
                merged: Operation::Full(lines),
            }
        }
        (Operation::Replace(last), Operation::Replace(next)) => merge_replaces(last, next),
    }
}

pub struct History {
    config: HistoryConfig,
    clock: Box<dyn Clock>,
    pending: Option<Step>,
    committed: VecDeque<Step>,
    redo: Vec<Step>,
    uncommitted: usize,
    deadline: Option<Instant>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default(), Box::new(SystemClock))
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("config", &self.config)
            .field("pending", &self.pending.is_some())
            .field("committed", &self.committed.len())
            .field("redo", &self.redo.len())
            .field("uncommitted", &self.uncommitted)
            .finish()
    }
}

impl History {
    pub fn new(config: HistoryConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            pending: None,
            committed: VecDeque::new(),
            redo: Vec::new(),
            uncommitted: 0,
            deadline: None,
        }
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Steps available to undo, pending step included.
    pub fn undo_depth(&self) -> usize {
        self.committed.len() + usize::from(self.pending.is_some())
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending step will be committed if nothing else happens.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record a step, merging it into the pending one.
    pub fn push(&mut self, step: Step) {
        self.poll();
        self.redo.clear();
        let next = match self.pending.take() {
            None => step,
            Some(pending) => {
                let MergeResult { commit, merged } = merge(pending.operation, step.operation);
                match commit {
                    Some(operation) => {
                        self.flush(Step {
                            operation,
                            cursor: pending.cursor,
                        });
                        self.uncommitted = 0;
                        Step {
                            operation: merged,
                            cursor: step.cursor,
                        }
                    }
                    None => Step {
                        operation: merged,
                        cursor: pending.cursor,
                    },
                }
            }
        };
        self.pending = Some(next);
        self.uncommitted += 1;

        if self.uncommitted > self.config.commit_interval {
            trace!(target: "state.history", uncommitted = self.uncommitted, "commit_interval_reached");
            self.commit();
        } else {
            self.deadline = Some(self.clock.now() + self.config.debounce);
        }
    }

    /// Capture a full snapshot of `buffer` before a coarse edit.
    pub fn frame(&mut self, buffer: &LineBuffer, cursor: SelectionIndex) {
        self.push(Step {
            operation: Operation::Full(buffer.lines().to_vec()),
            cursor,
        });
    }

    /// Capture `count` lines at `line` before an edit that turns them into
    /// `insert` lines.
    pub fn dirty(
        &mut self,
        buffer: &LineBuffer,
        line: usize,
        count: usize,
        insert: usize,
        cursor: SelectionIndex,
    ) {
        let lines = buffer.lines();
        let start = line.min(lines.len());
        let end = (line + count).min(lines.len());
        self.push(Step {
            operation: Operation::Replace(ReplaceFrame {
                index: line,
                deleted: lines[start..end].to_vec(),
                replaced: insert,
            }),
            cursor,
        });
    }

    /// Flush the pending step to the committed list.
    pub fn commit(&mut self) {
        self.uncommitted = 0;
        self.deadline = None;
        if let Some(step) = self.pending.take() {
            self.flush(step);
        }
    }

    fn flush(&mut self, step: Step) {
        self.committed.push_back(step);
        while self.committed.len() > self.config.backlog {
            self.committed.pop_front();
            trace!(target: "state.history", backlog = self.config.backlog, "backlog_trimmed");
        }
        trace!(target: "state.history", committed = self.committed.len(), "commit");
    }

    /// Commit the pending step if its debounce window has elapsed. Returns
    /// true when a commit happened.
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.commit();
                true
            }
            _ => false,
        }
    }

    /// Undo the newest step against `buffer`. `cursor` is where the caret sits
    /// now; redo will return to it.
    pub fn undo(&mut self, buffer: &LineBuffer, cursor: SelectionIndex) -> Option<Restore> {
        self.poll();
        let step = match self.pending.take() {
            Some(step) => {
                self.uncommitted = 0;
                self.deadline = None;
                step
            }
            None => self.committed.pop_back()?,
        };
        let (lines, inverse) = step.operation.apply(buffer.lines().to_vec());
        self.redo.push(Step {
            operation: inverse,
            cursor,
        });
        if self.redo.len() > self.config.backlog {
            self.redo.remove(0);
        }
        trace!(target: "state.history", undo_depth = self.undo_depth(), redo_depth = self.redo.len(), "undo_pop");
        Some(Restore {
            lines,
            cursor: step.cursor,
        })
    }

    /// Re-apply the most recently undone step.
    pub fn redo(&mut self, buffer: &LineBuffer, cursor: SelectionIndex) -> Option<Restore> {
        let step = self.redo.pop()?;
        self.commit();
        let (lines, inverse) = step.operation.apply(buffer.lines().to_vec());
        self.flush(Step {
            operation: inverse,
            cursor,
        });
        trace!(target: "state.history", undo_depth = self.undo_depth(), redo_depth = self.redo.len(), "redo_pop");
        Some(Restore {
            lines,
            cursor: step.cursor,
        })
    }

    /// Forget everything, discarding the pending step without committing it.
    pub fn clear(&mut self) {
        self.pending = None;
        self.committed.clear();
        self.redo.clear();
        self.uncommitted = 0;
        self.deadline = None;
    }
}
