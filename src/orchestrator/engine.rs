//! The orchestrator run loop.
//!
//! `start` spawns one independent task per non-skipped unit; tasks never
//! touch shared state, they only send events. A single dispatcher owns every
//! unit and applies completion and step-advance events one at a time,
//! interleaved with render ticks, so the state machine needs no further
//! synchronization. The run terminates exactly once, when every active unit
//! has reached a terminal status.

use crate::error::{FleetError, Result};
use crate::orchestrator::state::{OpFuture, Unit, UnitStatus};
use log::{debug, warn};
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Events sent by launched tasks back to the dispatcher.
enum UnitEvent {
    /// A step-backed unit finished one step successfully.
    StepDone { index: usize },
    /// A unit finished: its single operation ended, or a step failed.
    Finished { index: usize, result: Result<()> },
}

/// Drives a set of units to completion while rendering a live view.
pub struct Orchestrator {
    title: String,
    units: Vec<Unit>,
    tick: Duration,
    total_active: usize,
    done_count: usize,
    fail_count: usize,
    pub(crate) started: Instant,
    pub(crate) spin: usize,
}

impl Orchestrator {
    pub fn new(title: impl Into<String>, units: Vec<Unit>) -> Self {
        let total_active = units.iter().filter(|u| !u.is_skipped()).count();
        Self {
            title: title.into(),
            units,
            tick: Duration::from_millis(100),
            total_active,
            done_count: 0,
            fail_count: 0,
            started: Instant::now(),
            spin: 0,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn done_count(&self) -> usize {
        self.done_count
    }

    pub fn fail_count(&self) -> usize {
        self.fail_count
    }

    /// Units participating in execution (total minus skipped).
    pub fn total_active(&self) -> usize {
        self.total_active
    }

    pub fn has_active(&self) -> bool {
        self.total_active > 0
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.done_count >= self.total_active
    }

    /// Run all units to completion and return the failure count.
    ///
    /// Blocks until every non-skipped unit reaches a terminal status. The
    /// live view repaints in place on a terminal; otherwise only the final
    /// frame is printed.
    pub async fn run(&mut self) -> Result<usize> {
        if self.total_active == 0 {
            return Ok(0);
        }

        self.started = Instant::now();
        let (tx, mut rx) = mpsc::channel::<UnitEvent>(64);

        // Start every non-skipped unit.
        let mut immediate = Vec::new();
        for index in 0..self.units.len() {
            if self.units[index].is_skipped() {
                continue;
            }
            self.units[index].status = UnitStatus::InProgress;
            self.units[index].started = Some(Instant::now());
            match self.units[index].take_op() {
                Some((op, stepped)) => launch(index, stepped, op, tx.clone()),
                // An empty step queue completes without launching anything.
                None => immediate.push(index),
            }
        }
        for index in immediate {
            self.complete(index, Ok(()));
        }

        let live = io::stdout().is_terminal();
        let mut out = io::stdout();
        let mut painted = 0;
        if live {
            painted = self.paint(&mut out, painted).map_err(launch_error)?;
        }

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut interrupted = false;

        while !self.is_finished() {
            tokio::select! {
                _ = interval.tick() => {
                    self.spin += 1;
                    if live {
                        painted = self.paint(&mut out, painted).map_err(launch_error)?;
                    }
                }
                _ = tokio::signal::ctrl_c(), if !interrupted => {
                    // Stop issuing new step launches; in-flight operations
                    // are left to finish on their own.
                    warn!("interrupt received, no further steps will launch");
                    interrupted = true;
                }
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    self.dispatch(event, interrupted, &tx);
                }
            }
        }

        if live {
            self.paint(&mut out, painted).map_err(launch_error)?;
        } else {
            out.write_all(self.frame().as_bytes())?;
            out.flush()?;
        }
        Ok(self.fail_count)
    }

    /// Apply one event. All unit mutation funnels through here.
    fn dispatch(&mut self, event: UnitEvent, interrupted: bool, tx: &mpsc::Sender<UnitEvent>) {
        match event {
            UnitEvent::StepDone { index } => {
                self.units[index].advance_step();
                let next = if interrupted { None } else { self.units[index].take_op() };
                match next {
                    Some((op, stepped)) => launch(index, stepped, op, tx.clone()),
                    None => self.complete(index, Ok(())),
                }
            }
            UnitEvent::Finished { index, result } => self.complete(index, result),
        }
    }

    /// Transition a unit to its terminal status, exactly once.
    fn complete(&mut self, index: usize, result: Result<()>) {
        let unit = &mut self.units[index];
        debug_assert_eq!(unit.status, UnitStatus::InProgress);
        unit.duration = unit.started.map(|s| s.elapsed());
        match result {
            Ok(()) => unit.status = UnitStatus::Done,
            Err(err) => {
                debug!("unit {} failed: {}", unit.name, err);
                unit.status = UnitStatus::Failed;
                unit.error = Some(err);
                self.fail_count += 1;
            }
        }
        self.done_count += 1;
    }
}

/// Spawn one unit operation as an independent task. The task only reports
/// back over the channel.
fn launch(index: usize, stepped: bool, op: OpFuture, tx: mpsc::Sender<UnitEvent>) {
    tokio::spawn(async move {
        let result = op.await;
        let event = match result {
            Ok(()) if stepped => UnitEvent::StepDone { index },
            result => UnitEvent::Finished { index, result },
        };
        let _ = tx.send(event).await;
    });
}

fn launch_error(err: io::Error) -> FleetError {
    FleetError::Launch(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::state::{Step, boxed_op};
    use colored::Color;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn sleeping_unit(name: &str, ms: u64) -> Unit {
        Unit::single(
            name,
            Color::White,
            boxed_op(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }),
            "working",
            "done",
            "failed",
        )
    }

    fn failing_unit(name: &str) -> Unit {
        Unit::single(
            name,
            Color::White,
            boxed_op(async { Err(FleetError::Git("boom".to_string())) }),
            "working",
            "done",
            "failed",
        )
    }

    #[tokio::test]
    async fn test_three_repo_scenario() {
        // A succeeds after 10ms, B fails, C is pre-planned as skipped.
        let units = vec![
            sleeping_unit("alpha", 10),
            failing_unit("beta"),
            Unit::skipped("gamma", Color::White, "no remote found"),
        ];
        let mut orch = Orchestrator::new("Testing", units).with_tick(Duration::from_millis(10));
        assert_eq!(orch.total_active(), 2);

        let fail_count = orch.run().await.unwrap();
        assert_eq!(fail_count, 1);
        assert_eq!(orch.done_count(), 2);

        assert_eq!(orch.units()[0].status, UnitStatus::Done);
        assert!(orch.units()[0].duration.is_some());
        assert_eq!(orch.units()[1].status, UnitStatus::Failed);
        assert!(orch.units()[1].error.as_ref().unwrap().to_string().contains("boom"));
        // The skipped unit never transitions.
        assert_eq!(orch.units()[2].status, UnitStatus::Pending);

        let frame = orch.frame();
        assert_eq!(frame.matches("skipped").count(), 1);
    }

    #[tokio::test]
    async fn test_units_run_in_parallel() {
        // 100ms and 160ms operations must overlap: the run takes about the
        // max, not the sum.
        let units = vec![sleeping_unit("alpha", 100), sleeping_unit("beta", 160)];
        let mut orch = Orchestrator::new("Testing", units).with_tick(Duration::from_millis(20));

        let begin = Instant::now();
        let fail_count = orch.run().await.unwrap();
        let elapsed = begin.elapsed();

        assert_eq!(fail_count, 0);
        assert!(elapsed >= Duration::from_millis(160));
        assert!(
            elapsed < Duration::from_millis(250),
            "expected parallel completion, took {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_step_failure_abandons_remaining_steps() {
        let third_ran = Arc::new(AtomicBool::new(false));
        let flag = third_ran.clone();

        let steps = vec![
            Step::new("one", async { Ok(()) }),
            Step::new("two", async { Err(FleetError::Git("step two broke".to_string())) }),
            Step::new("three", async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }),
        ];
        let unit = Unit::steps("community", Color::Yellow, steps, "fetching", "3 branches", "failed to update");
        let mut orch = Orchestrator::new("Updating", vec![unit]).with_tick(Duration::from_millis(10));

        let fail_count = orch.run().await.unwrap();
        assert_eq!(fail_count, 1);
        assert_eq!(orch.units()[0].status, UnitStatus::Failed);
        assert!(
            orch.units()[0].error.as_ref().unwrap().to_string().contains("step two broke")
        );
        assert!(!third_ran.load(Ordering::SeqCst), "step three must never run");
    }

    #[tokio::test]
    async fn test_steps_complete_in_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mk = |n: &'static str, order: Arc<std::sync::Mutex<Vec<&'static str>>>| {
            Step::new(n, async move {
                order.lock().unwrap().push(n);
                Ok(())
            })
        };
        let steps = vec![
            mk("first", order.clone()),
            mk("second", order.clone()),
            mk("third", order.clone()),
        ];
        let unit = Unit::steps("community", Color::Yellow, steps, "fetching", "3 branches", "failed");
        let mut orch = Orchestrator::new("Updating", vec![unit]).with_tick(Duration::from_millis(10));

        let fail_count = orch.run().await.unwrap();
        assert_eq!(fail_count, 0);
        assert_eq!(orch.units()[0].status, UnitStatus::Done);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_all_skipped_returns_without_running() {
        let units = vec![Unit::skipped("a", Color::White, "nothing to do")];
        let mut orch = Orchestrator::new("Testing", units);
        assert!(!orch.has_active());
        assert_eq!(orch.run().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_step_queue_completes() {
        let unit = Unit::steps("community", Color::Yellow, Vec::new(), "fetching", "0 branches", "failed");
        let mut orch = Orchestrator::new("Updating", vec![unit]).with_tick(Duration::from_millis(10));
        assert_eq!(orch.run().await.unwrap(), 0);
        assert_eq!(orch.units()[0].status, UnitStatus::Done);
    }
}
