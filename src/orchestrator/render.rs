//! Frame rendering for the live status display.
//!
//! One line per unit in fixed registry order, independent of completion
//! order, topped by a progress header and followed by a warning line when
//! anything failed. The live loop repaints the previous frame in place.

use crate::error::FleetError;
use crate::orchestrator::Orchestrator;
use crate::orchestrator::state::{Unit, UnitStatus, Work};
use crate::style;
use colored::Colorize;
use crossterm::cursor::MoveUp;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

impl Orchestrator {
    /// Build the current frame as a string ending in a newline.
    pub fn frame(&self) -> String {
        let mut b = String::new();

        if self.is_finished() {
            let _ = writeln!(
                b,
                "{} Completed in {}",
                format!("✓ {} complete!", self.title()).magenta().bold(),
                fmt_duration(self.started.elapsed())
            );
        } else {
            let _ = writeln!(
                b,
                "{} Progress: {}/{} complete",
                format!("{}...", self.title()).magenta().bold(),
                self.done_count(),
                self.total_active()
            );
        }

        for unit in self.units() {
            b.push_str(&unit_lines(unit, self.spin));
        }

        if self.fail_count() > 0 {
            let _ = writeln!(
                b,
                "{}",
                format!("⚠ {} operation(s) failed", self.fail_count()).yellow().bold()
            );
        }

        b
    }

    /// Repaint in place: move up over the previous frame, clear it, and
    /// write the new one. Returns the new frame's height.
    pub(crate) fn paint<W: Write>(&self, out: &mut W, previous_lines: usize) -> io::Result<usize> {
        if previous_lines > 0 {
            out.queue(MoveUp(previous_lines as u16))?;
            out.queue(Clear(ClearType::FromCursorDown))?;
        }
        let frame = self.frame();
        out.write_all(frame.as_bytes())?;
        out.flush()?;
        Ok(frame.lines().count())
    }
}

fn unit_lines(unit: &Unit, spin: usize) -> String {
    let name = style::repo_name(&unit.name, unit.color);

    if let Some(reason) = unit.skip_reason() {
        return format!("{} {} - skipped ({})\n", "⊘".dimmed(), name, reason.dimmed());
    }

    match unit.status {
        UnitStatus::Pending | UnitStatus::InProgress => {
            let elapsed = unit.started.map(|s| s.elapsed()).unwrap_or_default();
            format!(
                "{} {} - {} ({})\n",
                SPINNER_FRAMES[spin % SPINNER_FRAMES.len()].cyan(),
                name,
                run_label(unit),
                fmt_duration(elapsed).dimmed()
            )
        }
        UnitStatus::Done => format!(
            "{} {} - {} ({})\n",
            style::checkmark(),
            name,
            done_label(unit),
            fmt_duration(unit.duration.unwrap_or_default()).dimmed()
        ),
        UnitStatus::Failed => failed_lines(unit, &name),
    }
}

fn failed_lines(unit: &Unit, name: &str) -> String {
    // Conflicted rebases render the conflicting paths instead of a bare
    // error line.
    if let Some(err) = &unit.error
        && let FleetError::RebaseConflicts { conflicts, .. } = err
    {
        let mut b = format!("{} {} - {}\n", style::cross(), name, err);
        for change in conflicts {
            if change.len() > 3 {
                let _ = writeln!(
                    b,
                    "   |{} {}",
                    style::colorize_status_code(&change[0..2]),
                    &change[3..]
                );
            }
        }
        return b;
    }

    let detail = unit
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown error".to_string());
    let mut b = format!("{} {} - {}\n", style::cross(), name, fail_label(unit));
    for line in detail.lines() {
        let _ = writeln!(b, "  {}", format!("Error: {}", line).red());
    }
    b
}

fn run_label(unit: &Unit) -> String {
    match &unit.work {
        Work::Single { run, .. } => run.clone(),
        Work::Steps { queue, verb, .. } => match queue.current_label() {
            Some(label) => format!(
                "{} '{}' [{}/{}]",
                verb,
                label,
                queue.cursor() + 1,
                queue.len()
            ),
            None => "finalizing...".to_string(),
        },
        Work::Skipped { .. } => String::new(),
    }
}

fn done_label(unit: &Unit) -> &str {
    match &unit.work {
        Work::Single { done, .. } => done,
        Work::Steps { done, .. } => done,
        Work::Skipped { .. } => "",
    }
}

fn fail_label(unit: &Unit) -> &str {
    match &unit.work {
        Work::Single { fail, .. } => fail,
        Work::Steps { fail, .. } => fail,
        Work::Skipped { .. } => "",
    }
}

/// Compact human duration: milliseconds under a second, fractional seconds
/// above.
pub fn fmt_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::state::boxed_op;
    use colored::Color;

    fn plain(s: &str) -> String {
        // Strip ANSI escapes so assertions see the text only.
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(Duration::from_millis(234)), "234ms");
        assert_eq!(fmt_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_frame_renders_one_line_per_unit_in_order() {
        let units = vec![
            Unit::skipped(".workspace", Color::Red, "no remote found"),
            Unit::single(
                "community",
                Color::Yellow,
                boxed_op(async { Ok(()) }),
                "pulling '17.0'",
                "pulled '17.0'",
                "failed to pull '17.0'",
            ),
        ];
        let orch = Orchestrator::new("Pulling branches", units);
        let frame = plain(&orch.frame());

        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Progress: 0/1 complete"));
        assert!(lines[1].contains(".workspace - skipped (no remote found)"));
        assert!(lines[2].contains("pulling '17.0'"));
    }

    #[test]
    fn test_frame_failure_lines() {
        let mut unit = Unit::single(
            "upgrade",
            Color::Blue,
            boxed_op(async { Ok(()) }),
            "pulling '17.0'",
            "pulled '17.0'",
            "failed to pull '17.0'",
        );
        unit.status = UnitStatus::Failed;
        unit.error = Some(FleetError::Git("fatal: couldn't connect".to_string()));

        let lines = plain(&unit_lines(&unit, 0));
        assert!(lines.contains("✗ upgrade - failed to pull '17.0'"));
        assert!(lines.contains("Error: fatal: couldn't connect"));
    }

    #[test]
    fn test_frame_rebase_conflicts_list_paths() {
        let mut unit = Unit::single(
            "community",
            Color::Yellow,
            boxed_op(async { Ok(()) }),
            "rebasing on '17.0'",
            "rebased on '17.0'",
            "failed to rebase on '17.0'",
        );
        unit.status = UnitStatus::Failed;
        unit.error = Some(FleetError::RebaseConflicts {
            branch: "17.0".to_string(),
            conflicts: vec!["UU addons/base/models.py".to_string()],
        });

        let lines = plain(&unit_lines(&unit, 0));
        assert!(lines.contains("conflicts rebasing on '17.0'"));
        assert!(lines.contains("|UU addons/base/models.py"));
    }

    #[test]
    fn test_step_unit_run_label_shows_progress() {
        use crate::orchestrator::state::Step;
        let steps = vec![
            Step::new("17.0", async { Ok(()) }),
            Step::new("16.0", async { Ok(()) }),
        ];
        let unit = Unit::steps("community", Color::Yellow, steps, "fetching", "2 branches", "failed");
        assert_eq!(run_label(&unit), "fetching '17.0' [1/2]");
    }
}
