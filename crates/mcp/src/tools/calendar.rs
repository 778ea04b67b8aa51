use chrono::Local;

use super::{ignore_param, ParamSpec};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn schema() -> (&'static str, Vec<ParamSpec>) {
    (
        "Returns the current date and time in the format YYYY-MM-DD HH:MM:SS. Use this to find out the current date and time.",
        vec![ignore_param()],
    )
}

pub fn now() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn now_uses_date_time_format() {
        let text = now();
        assert_eq!(text.len(), "2024-03-07 09:15:00".len());
        assert!(NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT).is_ok());
    }
}
