use chrono::NaiveDate;
use vault_rest_core::{Period, VaultBackend};

use super::{to_json, Arguments, ParamSpec, ToolError};

pub const DEFAULT_RECENT_LIMIT: u64 = 5;

fn period_param() -> ParamSpec {
    ParamSpec::string(
        "period",
        "The period type (daily, weekly, monthly, quarterly, yearly)",
    )
    .required()
    .one_of(Period::names())
}

pub fn periodic_note_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Get current periodic note for the specified period. Use this to e.g. find out the tasks or calendar for today.",
        vec![period_param()],
    )
}

pub fn periodic_date_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Get the periodic note for the specified period on the given date.",
        vec![
            ParamSpec::string(
                "date",
                "The date for which to get the periodic note (format: YYYY-MM-DD)",
            )
            .required(),
            period_param(),
        ],
    )
}

pub fn recent_periodic_schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Get the most recent periodic notes for the specified period.",
        vec![
            period_param(),
            ParamSpec::number("limit", "Maximum number of results to return (default: 5)")
                .default(DEFAULT_RECENT_LIMIT.into()),
            ParamSpec::boolean(
                "include_content",
                "Whether to include the content of the periodic note (default: false)",
            )
            .default(false.into()),
        ],
    )
}

pub async fn periodic_note(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let period = args.period()?;
    let note = backend.get_periodic_note(period).await?;
    to_json(&note)
}

pub async fn periodic_date(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let date = args.require_str("date")?;
    let period = args.period()?;

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        ToolError::Validation(format!("invalid date: {}, expected YYYY-MM-DD", date))
    })?;

    let note = backend.get_periodic_note_by_date(period, date).await?;
    to_json(&note)
}

pub async fn recent_periodic(
    backend: &dyn VaultBackend,
    args: &Arguments,
) -> Result<String, ToolError> {
    let period = args.period()?;
    let limit = args.positive_int("limit", DEFAULT_RECENT_LIMIT)?;
    let include_content = args.opt_bool("include_content", false)?;

    let notes = backend
        .get_periodic_note_recent(period, limit, include_content)
        .await?;
    to_json(&notes)
}
