//! Deterministic text renderer for generated plans.

use std::fmt::Write as _;

use crate::plan::MaintenancePlan;

/// Render a plan as readable terminal text with a stable section order.
pub fn render_plan_text(plan: &MaintenancePlan) -> String {
    let mut out = String::new();

    out.push_str("MAINTENANCE SCHEDULE\n");
    out.push_str("====================\n");
    if plan.partial {
        if plan.missing_sections.is_empty() {
            out.push_str("Note: this schedule is incomplete.\n");
        } else {
            let _ = writeln!(
                out,
                "Note: this schedule is incomplete; missing sections: {}.",
                plan.missing_sections.join(", ")
            );
        }
    }
    out.push('\n');

    for (index, item) in plan.schedule.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, item.task);
        if let Some(interval) = &item.interval {
            let _ = writeln!(out, "   Interval: {interval}");
        }
        if let Some(priority) = &item.priority {
            let _ = writeln!(out, "   Priority: {priority}");
        }
        if let Some(notes) = &item.notes {
            let _ = writeln!(out, "   Notes: {notes}");
        }
    }

    if !plan.safety_notes.is_empty() {
        out.push_str("\nSAFETY NOTES\n");
        for note in &plan.safety_notes {
            let _ = writeln!(out, "- {note}");
        }
    }

    if !plan.cost_estimates.is_empty() {
        out.push_str("\nCOST ESTIMATES\n");
        for estimate in &plan.cost_estimates {
            match &estimate.range {
                Some(range) => {
                    let _ = writeln!(out, "- {}: {range}", estimate.item);
                }
                None => {
                    let _ = writeln!(out, "- {}", estimate.item);
                }
            }
        }
    }

    if !plan.citations.is_empty() {
        out.push_str("\nREFERENCES\n");
        for citation in &plan.citations {
            match &citation.title {
                Some(title) => {
                    let _ = writeln!(out, "- {} ({title})", citation.reference);
                }
                None => {
                    let _ = writeln!(out, "- {}", citation.reference);
                }
            }
        }
    }

    out
}
