use serde::{Deserialize, Deserializer};

pub mod application_dto;
pub mod auth_dto;
pub mod chat_dto;
pub mod coach_dto;
pub mod interview_dto;
pub mod job_dto;
pub mod moderation_dto;
pub mod notification_dto;
pub mod translate_dto;

/// Treats empty and whitespace-only strings as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts either a JSON array of strings or one comma-separated string.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Raw::Csv(raw) => split_csv(&raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn csv_drops_empty_items() {
        assert_eq!(split_csv(" a, ,b,,c "), ["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }
}
