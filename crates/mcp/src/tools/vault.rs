use std::path::Path;

use vault_rest_core::VaultBackend;

use super::{ignore_param, to_json, Arguments, ParamSpec, ToolError};

pub fn list_files_in_vault_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Lists all files and directories in the root directory of your Obsidian vault.",
        vec![ignore_param()],
    )
}

pub fn list_files_in_dir_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Lists all files and directories in a specific directory of your Obsidian vault.",
        vec![ParamSpec::string(
            "dirpath",
            "Path to list files from (relative to your vault root). Note that empty directories will not be returned.",
        )
        .required()],
    )
}

pub fn get_file_contents_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Retrieves the contents of a file in your Obsidian vault.",
        vec![ParamSpec::string("filepath", "Path to the file (relative to your vault root).").required()],
    )
}

pub fn get_file_by_name_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Retrieves the contents of a file in your Obsidian vault by its name. Use this to e.g. resolve `[[filename]]` or `[[filename|alias]]` links in files.",
        vec![
            ParamSpec::string("filename", "Name of the file to retrieve (without path).").required(),
            ParamSpec::boolean(
                "include_content",
                "Whether to include the content of the file (default: false)",
            )
            .default(false.into()),
        ],
    )
}

pub async fn list_files_in_vault(backend: &dyn VaultBackend) -> Result<String, ToolError> {
    let files = backend.list_files_in_vault().await?;
    to_json(&files)
}

pub async fn list_files_in_dir(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let dirpath = args.require_str("dirpath")?;
    let files = backend.list_files_in_dir(dirpath).await?;
    to_json(&files)
}

pub async fn get_file_contents(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let filepath = args.require_str("filepath")?;
    let contents = backend.get_file_contents(filepath).await?;
    to_json(&contents)
}

pub async fn get_file_by_name(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let filename = note_name(args.require_str("filename")?);
    if filename.is_empty() {
        return Err(ToolError::Validation("filename is required".to_string()));
    }
    let include_content = args.opt_bool("include_content", false)?;

    let files = backend.get_file_by_name(&filename, include_content).await?;
    to_json(&files)
}

/// `folder/Some Note.md` -> `Some Note`, which is how notes are named in links.
fn note_name(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
