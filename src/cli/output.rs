//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::domain::models::{Action, ActionOutcome, WorkflowGraph};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Action returned by a step, as printed by `run` and `ingest`.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ActionOutput(pub Action);

impl CommandOutput for ActionOutput {
    fn to_human(&self) -> String {
        let action = &self.0;
        let mut lines = Vec::new();

        match action.outcome() {
            ActionOutcome::Complete { update_spec } => {
                lines.push("Outcome: complete".to_string());
                if let Some(update) = update_spec {
                    if let Some(ref dir) = update.prev_run_dir {
                        lines.push(format!("  prev_run_dir: {dir}"));
                    }
                    if let Some(ref task_type) = update.prev_task_type {
                        lines.push(format!("  prev_task_type: {task_type}"));
                    }
                    if let Some(ref tags) = update.run_tags {
                        lines.push(format!(
                            "  run_tags: [{}]",
                            tags.iter().collect::<Vec<_>>().join(", ")
                        ));
                    }
                }
            }
            ActionOutcome::Detour { workflow } => {
                lines.push(format!("Outcome: detour ({} nodes)", workflow.nodes().len()));
                lines.push(format_detour_table(workflow));
            }
            ActionOutcome::Defuse => lines.push("Outcome: defuse children".to_string()),
        }

        if !action.stored_data().is_empty() {
            lines.push("Stored data:".to_string());
            for (key, value) in action.stored_data() {
                lines.push(format!("  {key}: {value}"));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }
}

/// Render the nodes of a detour graph as a table.
pub fn format_detour_table(graph: &WorkflowGraph) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Task type").add_attribute(Attribute::Bold),
            Cell::new("Steps").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Parents").add_attribute(Attribute::Bold),
        ]);

    for node in graph.nodes() {
        let steps: Vec<&str> = node.steps.iter().map(|s| s.name()).collect();
        let parents: Vec<String> = graph.parents(node.id).iter().map(ToString::to_string).collect();
        table.add_row(vec![
            Cell::new(node.id),
            Cell::new(&node.name),
            Cell::new(node.spec.task_type.as_deref().unwrap_or("-")),
            Cell::new(steps.join(", ")),
            Cell::new(node.spec.priority.map_or_else(|| "-".to_string(), |p| p.to_string())),
            Cell::new(if parents.is_empty() { "-".to_string() } else { parents.join(", ") }),
        ]);
    }

    table.to_string()
}

/// Derived label printed by `label`.
#[derive(Debug, Serialize)]
pub struct LabelOutput {
    pub label: String,
    pub formula: String,
    pub task_type: String,
}

impl CommandOutput for LabelOutput {
    fn to_human(&self) -> String {
        self.label.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
