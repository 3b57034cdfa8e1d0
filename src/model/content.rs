//! Content values and content types accepted by an instance.

use super::error::ContentError;
use serde::Deserialize;

/// How chunk content is interpreted by the splitter and the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Markup. Chunk boundaries are repaired so they never split a tag.
    #[default]
    Html,
    /// Plain text. Chunks are cut at fixed lengths.
    Text,
}

impl ContentType {
    /// Lowercase name, matching the config file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "html",
            ContentType::Text => "text",
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(ContentType::Html),
            "text" => Ok(ContentType::Text),
            other => Err(format!("unknown content type '{other}' (expected html or text)")),
        }
    }
}

/// A value handed to `set_text` / `set_html`.
///
/// Strings are taken as-is, numbers are stringified, and an absent value becomes the
/// empty string. Non-finite numbers are rejected when the value is converted.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    /// A string.
    Text(String),
    /// An integer, stringified in decimal.
    Integer(i64),
    /// A floating point number; must be finite.
    Number(f64),
    /// No value (treated as empty content).
    Empty,
}

impl ContentValue {
    /// Convert into the string that will be split into chunks.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidContent`] for NaN or infinite numbers.
    ///
    /// # Examples
    ///
    /// ```
    /// use virtual_content::model::ContentValue;
    ///
    /// assert_eq!(ContentValue::from(42).into_string().unwrap(), "42");
    /// assert_eq!(ContentValue::from(1.5).into_string().unwrap(), "1.5");
    /// assert_eq!(ContentValue::from(None::<&str>).into_string().unwrap(), "");
    /// assert!(ContentValue::from(f64::INFINITY).into_string().is_err());
    /// ```
    pub fn into_string(self) -> Result<String, ContentError> {
        match self {
            ContentValue::Text(s) => Ok(s),
            ContentValue::Integer(n) => Ok(n.to_string()),
            ContentValue::Number(n) if n.is_finite() => Ok(n.to_string()),
            ContentValue::Number(value) => Err(ContentError::InvalidContent { value }),
            ContentValue::Empty => Ok(String::new()),
        }
    }
}

impl From<String> for ContentValue {
    fn from(value: String) -> Self {
        ContentValue::Text(value)
    }
}

impl From<&str> for ContentValue {
    fn from(value: &str) -> Self {
        ContentValue::Text(value.to_string())
    }
}

impl From<&String> for ContentValue {
    fn from(value: &String) -> Self {
        ContentValue::Text(value.clone())
    }
}

impl From<f64> for ContentValue {
    fn from(value: f64) -> Self {
        ContentValue::Number(value)
    }
}

impl From<f32> for ContentValue {
    fn from(value: f32) -> Self {
        ContentValue::Number(f64::from(value))
    }
}

impl From<i64> for ContentValue {
    fn from(value: i64) -> Self {
        ContentValue::Integer(value)
    }
}

impl From<i32> for ContentValue {
    fn from(value: i32) -> Self {
        ContentValue::Integer(i64::from(value))
    }
}

impl From<u32> for ContentValue {
    fn from(value: u32) -> Self {
        ContentValue::Integer(i64::from(value))
    }
}

impl From<()> for ContentValue {
    fn from(_: ()) -> Self {
        ContentValue::Empty
    }
}

impl<T: Into<ContentValue>> From<Option<T>> for ContentValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ContentValue::Empty, Into::into)
    }
}
