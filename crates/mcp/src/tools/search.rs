use vault_rest_core::{QueryType, VaultBackend};

use super::{to_json, Arguments, ParamSpec, ToolError};

pub const DEFAULT_CONTEXT_LENGTH: u64 = 100;

pub fn simple_search_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Simple search for documents matching a specified text query across all files in the vault. Use this tool when you want to do a simple text search",
        vec![
            ParamSpec::string("query", "The text to search for in your vault.").required(),
            ParamSpec::number(
                "content_length",
                "How much context to return around the matching string (default: 100)",
            )
            .default(DEFAULT_CONTEXT_LENGTH.into()),
        ],
    )
}

pub fn jsonlogic_search_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Complex search for documents using a JsonLogic query. Supports standard JsonLogic operators plus 'glob' and 'regexp' for pattern matching. Results must be non-falsy. Use this tool when you want to do a complex search, e.g. for all documents with certain tags etc.",
        vec![ParamSpec::string(
            "query",
            "JsonLogic query object. Example: {\"glob\": [\"*.md\", {\"var\": \"path\"}]} matches all markdown files",
        )
        .required()],
    )
}

pub fn dataview_search_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Complex search for documents using a Dataview DQL query. Use this tool when you want to do a complex search, e.g. for all documents with certain tags etc.",
        vec![ParamSpec::string(
            "query",
            "Dataview query string. Example: 'table name, path from #tag'",
        )
        .required()],
    )
}

pub async fn simple_search(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let query = args.require_str("query")?;
    let context_length = args.positive_int("content_length", DEFAULT_CONTEXT_LENGTH)?;

    let results = backend.simple_search(query, context_length).await?;
    to_json(&results)
}

pub async fn jsonlogic_search(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    complex_search(backend, args, QueryType::JsonLogic).await
}

pub async fn dataview_search(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    complex_search(backend, args, QueryType::DataviewDql).await
}

async fn complex_search(
    backend: &dyn VaultBackend,
    args: &Arguments,
    query_type: QueryType,
) -> Result<String, ToolError> {
    let query = args.require_str("query")?;
    let results = backend.complex_search(query, &query_type).await?;
    to_json(&results)
}
