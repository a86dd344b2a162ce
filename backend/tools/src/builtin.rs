//! Tools shipped with the copilot, matching the operations the bridge understands.

use crate::definition::{PayloadKind, ToolDefinition};

pub const RUN_PYTHON_SCRIPT: &str = "run-python-script";
pub const PING_BRIDGE: &str = "ping-bridge";
pub const LIST_FUSION_TOOLS: &str = "list-fusion-tools";

/// Inline Python executed inside the Resolve scripting environment.
pub fn python_script_tool() -> ToolDefinition {
    ToolDefinition {
        id: RUN_PYTHON_SCRIPT.into(),
        label: "Run Python Script".into(),
        description: "Runs a Python snippet using the Resolve scripting API (Python 3). \
            You can use 'resolve', 'fusion', and 'comp' in your script. Those are already defined for you. \
            If you want to return a value, you must set a global variable named 'result' in your script."
            .into(),
        requires_input: true,
        placeholder: Some(
            "# Python script\nprint('Resolve timeline:', resolve.GetProjectManager().GetCurrentProject().GetName())"
                .into(),
        ),
        sample: Some(
            "# Normalize audio levels on selected clips\n\
             project = resolve.GetProjectManager().GetCurrentProject()\n\
             timeline = project.GetCurrentTimeline()\n\
             for clip in timeline.GetItemListInTrack('audio', 1):\n    clip.SetProperty('NormalizeAudioLevels', True)"
                .into(),
        ),
        payload: PayloadKind::RunScript {
            language: "python".into(),
        },
    }
}

pub fn ping_tool() -> ToolDefinition {
    ToolDefinition {
        id: PING_BRIDGE.into(),
        label: "Ping Resolve".into(),
        description: "Checks that the Resolve bridge is running and reports the currently open page.".into(),
        requires_input: false,
        placeholder: None,
        sample: None,
        payload: PayloadKind::Fixed { op: "ping".into() },
    }
}

pub fn list_fusion_tools_tool() -> ToolDefinition {
    ToolDefinition {
        id: LIST_FUSION_TOOLS.into(),
        label: "List Fusion Tools".into(),
        description: "Lists the nodes of the open Fusion composition with their id, name and class. \
            Fails with 'no_fusion_comp_open' when no composition is open."
            .into(),
        requires_input: false,
        placeholder: None,
        sample: None,
        payload: PayloadKind::Fixed {
            op: "list_tools".into(),
        },
    }
}

/// The default catalog, in presentation order.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![python_script_tool(), ping_tool(), list_fusion_tools_tool()]
}
