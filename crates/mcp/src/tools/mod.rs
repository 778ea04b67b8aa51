mod args;
mod calendar;
mod periodic;
mod search;
mod vault;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use vault_rest_core::VaultBackend;

pub use args::{Arguments, ToolError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub allowed: Option<Vec<&'static str>>,
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
            allowed: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn one_of(mut self, allowed: Vec<&'static str>) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.kind.as_str()));
            property.insert("description".to_string(), json!(param.description));
            if let Some(default) = &param.default {
                property.insert("default".to_string(), default.clone());
            }
            if let Some(allowed) = &param.allowed {
                property.insert("enum".to_string(), json!(allowed));
            }
            properties.insert(param.name.to_string(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Every tool the server offers. `Tool::ALL` is the advertised order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Calendar,
    ListFilesInVault,
    ListFilesInDir,
    GetFileContents,
    GetFileByName,
    SimpleSearch,
    JsonLogicSearch,
    DataviewSearch,
    PeriodicNote,
    PeriodicNoteByDate,
    RecentPeriodicNotes,
}

impl Tool {
    pub const ALL: [Tool; 11] = [
        Tool::Calendar,
        Tool::ListFilesInVault,
        Tool::ListFilesInDir,
        Tool::GetFileContents,
        Tool::GetFileByName,
        Tool::SimpleSearch,
        Tool::JsonLogicSearch,
        Tool::DataviewSearch,
        Tool::PeriodicNote,
        Tool::PeriodicNoteByDate,
        Tool::RecentPeriodicNotes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Calendar => "calendar",
            Tool::ListFilesInVault => "obsidian_list_files_in_vault",
            Tool::ListFilesInDir => "obsidian_list_files_in_dir",
            Tool::GetFileContents => "obsidian_get_file_contents",
            Tool::GetFileByName => "obsidian_get_file_by_name",
            Tool::SimpleSearch => "obsidian_simple_search",
            Tool::JsonLogicSearch => "obsidian_jsonlogic_search",
            Tool::DataviewSearch => "obsidian_dataview_search",
            Tool::PeriodicNote => "obsidian_get_periodic_note",
            Tool::PeriodicNoteByDate => "obsidian_get_periodic_date",
            Tool::RecentPeriodicNotes => "obsidian_get_recent_periodic_note",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let (description, params) = match self {
            Tool::Calendar => calendar::schema(),
            Tool::ListFilesInVault => vault::list_files_in_vault_schema(),
            Tool::ListFilesInDir => vault::list_files_in_dir_schema(),
            Tool::GetFileContents => vault::get_file_contents_schema(),
            Tool::GetFileByName => vault::get_file_by_name_schema(),
            Tool::SimpleSearch => search::simple_search_schema(),
            Tool::JsonLogicSearch => search::jsonlogic_search_schema(),
            Tool::DataviewSearch => search::dataview_search_schema(),
            Tool::PeriodicNote => periodic::periodic_note_schema(),
            Tool::PeriodicNoteByDate => periodic::periodic_date_schema(),
            Tool::RecentPeriodicNotes => periodic::recent_periodic_schema(),
        };

        ToolDescriptor {
            name: self.name(),
            description,
            params,
        }
    }

    /// Run the tool and return its output text.
    pub async fn call(
        &self,
        backend: &dyn VaultBackend,
        args: &Arguments,
    ) -> Result<String, ToolError> {
        match self {
            Tool::Calendar => Ok(calendar::now()),
            Tool::ListFilesInVault => vault::list_files_in_vault(backend).await,
            Tool::ListFilesInDir => vault::list_files_in_dir(backend, args).await,
            Tool::GetFileContents => vault::get_file_contents(backend, args).await,
            Tool::GetFileByName => vault::get_file_by_name(backend, args).await,
            Tool::SimpleSearch => search::simple_search(backend, args).await,
            Tool::JsonLogicSearch => search::jsonlogic_search(backend, args).await,
            Tool::DataviewSearch => search::dataview_search(backend, args).await,
            Tool::PeriodicNote => periodic::periodic_note(backend, args).await,
            Tool::PeriodicNoteByDate => periodic::periodic_date(backend, args).await,
            Tool::RecentPeriodicNotes => periodic::recent_periodic(backend, args).await,
        }
    }
}

/// Outcome of a `tools/call`, in the shape MCP clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    pub fn text_content(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

pub fn list_tools() -> Vec<ToolDefinition> {
    Tool::ALL.iter().map(|t| t.descriptor().definition()).collect()
}

/// Resolve `name`, run it, and fold any failure into an error result.
pub async fn call_tool(backend: &dyn VaultBackend, name: &str, arguments: Value) -> ToolResult {
    match dispatch(backend, name, arguments).await {
        Ok(text) => {
            info!(tool = name, "tool call succeeded");
            ToolResult::text(text)
        }
        Err(e) if e.is_validation() => {
            info!(tool = name, error = %e, "tool call rejected");
            ToolResult::error(e.to_string())
        }
        Err(e) => {
            warn!(tool = name, error = %e, "tool call failed");
            ToolResult::error(e.to_string())
        }
    }
}

async fn dispatch(
    backend: &dyn VaultBackend,
    name: &str,
    arguments: Value,
) -> Result<String, ToolError> {
    let tool = Tool::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
    let args = Arguments::from_value(arguments)?;
    tool.call(backend, &args).await
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string(value)?)
}

fn ignore_param() -> ParamSpec {
    ParamSpec::string("ignore", "ignore this parameter")
}
