use serde::Serialize;
use serde_json::{Value, json};

/// A tool the chat client may be asked to run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the tool's arguments.
    pub schema: Value,
    pub confirm: bool,
}

pub fn list_tools(_site_id: &str) -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "openBibliography",
            description: "Open the Bibliography page with filters",
            schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "type": {"type": "string"},
                    "yearMin": {"type": "integer"},
                    "yearMax": {"type": "integer"}
                }
            }),
            confirm: false,
        },
        ToolDescriptor {
            name: "copyWikiBlock",
            description: "Copy the current Wikipedia block to clipboard",
            schema: json!({
                "type": "object",
                "properties": {"selection": {"type": "string"}}
            }),
            confirm: true,
        },
    ]
}
