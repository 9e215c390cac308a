//! Per-unit state for one orchestrator run.
//!
//! A unit is one repository's tracked operation: either a single async
//! operation or an ordered queue of sub-steps that run strictly one at a
//! time for that repository. Units are created during planning and mutated
//! only by the orchestrator's event handler.

use crate::error::{FleetError, Result};
use colored::Color;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// A unit's operation: an async task producing success or a unit error.
pub type OpFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Box an async block into an [`OpFuture`].
pub fn boxed_op<F>(fut: F) -> OpFuture
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    Box::pin(fut)
}

/// Status of one unit. Transitions are strictly
/// Pending -> InProgress -> {Done, Failed}, never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

/// One sub-step of a unit: a display label plus its operation.
pub struct Step {
    label: String,
    op: Option<OpFuture>,
}

impl Step {
    pub fn new<F>(label: impl Into<String>, fut: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            label: label.into(),
            op: Some(boxed_op(fut)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered list of step descriptors plus a cursor, owned by one unit.
/// The cursor is monotonically non-decreasing and bounded by the length.
pub struct StepQueue {
    steps: Vec<Step>,
    cursor: usize,
}

impl StepQueue {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Label of the current step, or `None` when exhausted.
    pub fn current_label(&self) -> Option<&str> {
        self.steps.get(self.cursor).map(|s| s.label())
    }

    /// Take the current step's operation for launching. Does not advance.
    pub(crate) fn take_current(&mut self) -> Option<OpFuture> {
        self.steps.get_mut(self.cursor).and_then(|s| s.op.take())
    }

    /// Move past the current step. Only valid after it completed
    /// successfully.
    pub(crate) fn advance(&mut self) {
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

pub(crate) enum Work {
    Single {
        op: Option<OpFuture>,
        run: String,
        done: String,
        fail: String,
    },
    Steps {
        queue: StepQueue,
        /// Verb shown while a step runs, e.g. "fetching".
        verb: String,
        done: String,
        fail: String,
    },
    Skipped {
        reason: String,
    },
}

/// One repository's tracked operation within a single orchestrator run.
pub struct Unit {
    pub name: String,
    pub color: Color,
    pub status: UnitStatus,
    pub error: Option<FleetError>,
    pub started: Option<Instant>,
    pub duration: Option<Duration>,
    pub(crate) work: Work,
}

impl Unit {
    fn with_work(name: impl Into<String>, color: Color, work: Work) -> Self {
        Self {
            name: name.into(),
            color,
            status: UnitStatus::Pending,
            error: None,
            started: None,
            duration: None,
            work,
        }
    }

    /// A unit backed by one operation. `run`, `done` and `fail` are the
    /// messages rendered next to the repository in each state.
    pub fn single(
        name: impl Into<String>,
        color: Color,
        op: OpFuture,
        run: impl Into<String>,
        done: impl Into<String>,
        fail: impl Into<String>,
    ) -> Self {
        Self::with_work(
            name,
            color,
            Work::Single {
                op: Some(op),
                run: run.into(),
                done: done.into(),
                fail: fail.into(),
            },
        )
    }

    /// A unit backed by an ordered step queue.
    pub fn steps(
        name: impl Into<String>,
        color: Color,
        steps: Vec<Step>,
        verb: impl Into<String>,
        done: impl Into<String>,
        fail: impl Into<String>,
    ) -> Self {
        Self::with_work(
            name,
            color,
            Work::Steps {
                queue: StepQueue::new(steps),
                verb: verb.into(),
                done: done.into(),
                fail: fail.into(),
            },
        )
    }

    /// A unit excluded from execution, rendered once with a static reason.
    pub fn skipped(name: impl Into<String>, color: Color, reason: impl Into<String>) -> Self {
        Self::with_work(
            name,
            color,
            Work::Skipped {
                reason: reason.into(),
            },
        )
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.work, Work::Skipped { .. })
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match &self.work {
            Work::Skipped { reason } => Some(reason),
            _ => None,
        }
    }

    /// Cursor and length of the step queue, for step-backed units.
    pub fn step_progress(&self) -> Option<(usize, usize)> {
        match &self.work {
            Work::Steps { queue, .. } => Some((queue.cursor(), queue.len())),
            _ => None,
        }
    }

    /// Take the next operation to launch. The bool is true for step-backed
    /// units, whose successful completions advance the queue instead of
    /// finishing the unit.
    pub(crate) fn take_op(&mut self) -> Option<(OpFuture, bool)> {
        match &mut self.work {
            Work::Single { op, .. } => op.take().map(|f| (f, false)),
            Work::Steps { queue, .. } => queue.take_current().map(|f| (f, true)),
            Work::Skipped { .. } => None,
        }
    }

    pub(crate) fn advance_step(&mut self) {
        if let Work::Steps { queue, .. } = &mut self.work {
            queue.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> OpFuture {
        boxed_op(async { Ok(()) })
    }

    #[test]
    fn test_step_queue_cursor_bounded() {
        let mut queue = StepQueue::new(vec![Step::new("a", async { Ok(()) })]);
        assert_eq!(queue.cursor(), 0);
        assert_eq!(queue.current_label(), Some("a"));

        queue.advance();
        assert!(queue.is_exhausted());
        assert_eq!(queue.current_label(), None);

        queue.advance();
        assert_eq!(queue.cursor(), 1);
    }

    #[test]
    fn test_step_queue_take_current_does_not_advance() {
        let mut queue = StepQueue::new(vec![
            Step::new("a", async { Ok(()) }),
            Step::new("b", async { Ok(()) }),
        ]);
        assert!(queue.take_current().is_some());
        assert_eq!(queue.cursor(), 0);
        // The operation is gone until the cursor moves.
        assert!(queue.take_current().is_none());

        queue.advance();
        assert!(queue.take_current().is_some());
    }

    #[test]
    fn test_single_unit_op_taken_once() {
        let mut unit = Unit::single("community", Color::Yellow, noop(), "run", "done", "fail");
        assert!(!unit.is_skipped());
        let (_, stepped) = unit.take_op().unwrap();
        assert!(!stepped);
        assert!(unit.take_op().is_none());
    }

    #[test]
    fn test_skipped_unit_has_no_op() {
        let mut unit = Unit::skipped(".workspace", Color::Red, "no remote found");
        assert!(unit.is_skipped());
        assert_eq!(unit.skip_reason(), Some("no remote found"));
        assert!(unit.take_op().is_none());
        assert_eq!(unit.status, UnitStatus::Pending);
    }

    #[test]
    fn test_step_unit_progress() {
        let steps = vec![
            Step::new("17.0", async { Ok(()) }),
            Step::new("16.0", async { Ok(()) }),
        ];
        let mut unit = Unit::steps("community", Color::Yellow, steps, "fetching", "2 branches", "failed");
        assert_eq!(unit.step_progress(), Some((0, 2)));

        let (_, stepped) = unit.take_op().unwrap();
        assert!(stepped);
        unit.advance_step();
        assert_eq!(unit.step_progress(), Some((1, 2)));
    }
}
