use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Parsed YAML front-matter of a post file.
///
/// The block sits between `---` delimiters at the top of the file.
/// `title`, `date` and `path` are required; a file that omits any of
/// them is rejected rather than rendered with placeholder values.
#[derive(Debug, Clone)]
pub struct FrontMatter {
    pub title: String,
    pub date: DateTime<Local>,
    pub path: String,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,
    pub cover: Option<String>,
    pub keywords: Vec<String>,
    pub draft: bool,
}

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing front-matter block (expected leading `---`)")]
    Missing,
    #[error("unclosed front-matter block (missing closing `---`)")]
    Unclosed,
    #[error("invalid front-matter YAML: {0}")]
    InvalidYaml(String),
    #[error("missing required front-matter field `{0}`")]
    MissingField(&'static str),
    #[error("unrecognized date `{0}`")]
    InvalidDate(String),
    #[error("post path `{0}` must not contain `.` or `..` segments")]
    UnsafePath(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<String>,
    date: Option<String>,
    path: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    tags: Vec<String>,
    excerpt: Option<String>,
    cover: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    keywords: Vec<String>,
    draft: bool,
}

/// Accepts `tags: rust`, `tags: [rust, wasm]` and a bare `tags:`.
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

impl FrontMatter {
    /// Splits `content` into front-matter and body, validating the
    /// front-matter. Returns the parsed block and the remaining
    /// markdown body.
    pub fn parse(content: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
        let rest = content
            .strip_prefix("---")
            .ok_or(FrontMatterError::Missing)?;
        let end = rest.find("\n---").ok_or(FrontMatterError::Unclosed)?;
        let yaml = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\r', '\n']);

        let raw: RawFrontMatter = serde_yaml::from_str(yaml)
            .map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))?;

        let title = raw.title.ok_or(FrontMatterError::MissingField("title"))?;
        let date_str = raw.date.ok_or(FrontMatterError::MissingField("date"))?;
        let path = raw.path.ok_or(FrontMatterError::MissingField("path"))?;

        let date = parse_date_string(&date_str)
            .ok_or_else(|| FrontMatterError::InvalidDate(date_str.clone()))?;

        Ok((
            FrontMatter {
                title,
                date,
                path: normalize_path(&path)?,
                tags: raw.tags,
                excerpt: raw.excerpt,
                cover: raw.cover,
                keywords: raw.keywords,
                draft: raw.draft,
            },
            body,
        ))
    }
}

/// Canonical form: leading slash, no trailing slash. The path doubles
/// as an output directory under `public/`, so `.` and `..` segments
/// are rejected rather than resolved.
fn normalize_path(path: &str) -> Result<String, FrontMatterError> {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    if trimmed.split('/').any(|seg| seg == "." || seg == "..") {
        return Err(FrontMatterError::UnsafePath(path.trim().to_string()));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{}", trimmed))
    }
}

/// Parses the date formats commonly found in post front-matter.
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M:%S"];
    for fmt in datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(dt) = Local.from_local_datetime(&naive).single() {
                return Some(dt);
            }
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            if let Some(dt) = Local.from_local_datetime(&naive).single() {
                return Some(dt);
            }
        }
    }

    None
}
