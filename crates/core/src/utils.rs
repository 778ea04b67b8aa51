/// Turn a vault-relative path into a request path.
///
/// The leading `/` is dropped and every segment is percent-encoded, so
/// `/My Notes/a&b.md` becomes `My%20Notes/a%26b.md`. Separators, including a
/// trailing one used for directory listings, are kept.
pub fn encode_vault_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `2024-03-07` -> `2024/03/07`
pub fn date_path(date: &str) -> String {
    date.replace('-', "/")
}

/// Quote a note name as a DQL string literal.
pub fn dql_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
