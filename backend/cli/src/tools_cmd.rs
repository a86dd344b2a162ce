//! CLI Tools Command
//!
//! Prints the tool catalog.

use anyhow::Result;
use copilot_tools::ToolRegistry;

use crate::terminal_output::{render_table, styled, DIM};

pub fn run(registry: &ToolRegistry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&registry.catalog())?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = registry
        .list()
        .iter()
        .map(|tool| {
            vec![
                tool.id.clone(),
                tool.label.clone(),
                if tool.requires_input { "script" } else { "-" }.to_string(),
                tool.description.clone(),
            ]
        })
        .collect();
    print!("{}", render_table(&["ID", "LABEL", "INPUT", "DESCRIPTION"], &rows, 60));
    println!(
        "\n{}",
        styled("Run one with: copilot run <id> [--input TEXT | --file PATH]", DIM)
    );
    Ok(())
}
