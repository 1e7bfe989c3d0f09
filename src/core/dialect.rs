use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

#[cfg(windows)]
const PLATFORM_NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
const PLATFORM_NEWLINE: &str = "\n";

/// How values are protected when they contain dialect characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    /// Values are written verbatim. A value holding the delimiter, the quote
    /// or a line break produces a row that cannot be parsed back reliably.
    #[default]
    Never,
    /// Values holding the delimiter, the quote or a line break are quoted and
    /// inner quotes doubled.
    Necessary,
}

/// Delimiter, quote and newline configuration shared by every row of a
/// conversion.
///
/// The default dialect uses `,`, `"` and the platform line terminator, and
/// writes values verbatim ([`QuoteMode::Never`]).
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::dialect::{CsvDialect, QuoteMode};
///
/// let dialect = CsvDialect::builder()
///     .delimiter(";")
///     .newline("\n")
///     .build()
///     .unwrap();
///
/// assert_eq!(dialect.delimiter(), ";");
/// assert_eq!(dialect.quote(), "\"");
/// assert_eq!(dialect.quote_mode(), QuoteMode::Never);
/// ```
///
/// A dialect can also be stored as JSON; missing fields take their default:
///
/// ```
/// use geoshape_csv::core::dialect::{CsvDialect, QuoteMode};
///
/// let json = r#"{"delimiter": "\t", "quote_mode": "necessary"}"#;
/// let dialect = CsvDialect::from_json(json).unwrap();
///
/// assert_eq!(dialect.delimiter(), "\t");
/// assert_eq!(dialect.quote_mode(), QuoteMode::Necessary);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvDialect {
    delimiter: String,
    quote: String,
    newline: String,
    quote_mode: QuoteMode,
}

impl Default for CsvDialect {
    fn default() -> Self {
        CsvDialect {
            delimiter: ",".to_string(),
            quote: "\"".to_string(),
            newline: PLATFORM_NEWLINE.to_string(),
            quote_mode: QuoteMode::Never,
        }
    }
}

impl CsvDialect {
    /// Creates a verbatim dialect from its three strings.
    pub fn new(delimiter: &str, quote: &str, newline: &str) -> Self {
        CsvDialect {
            delimiter: delimiter.to_string(),
            quote: quote.to_string(),
            newline: newline.to_string(),
            quote_mode: QuoteMode::Never,
        }
    }

    pub fn builder() -> CsvDialectBuilder {
        CsvDialectBuilder::new()
    }

    /// Parses and validates a dialect stored as JSON.
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        let dialect: CsvDialect = serde_json::from_str(json)
            .map_err(|error| ConvertError::Configuration(error.to_string()))?;
        dialect.validate()?;
        Ok(dialect)
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    /// Checks that the dialect can be written in its quote mode.
    ///
    /// Verbatim output accepts any strings. Quoting delegates to the `csv`
    /// crate, which needs a one-byte delimiter and quote and a newline of
    /// `\n`, `\r\n` or one byte.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.quote_mode == QuoteMode::Never {
            return Ok(());
        }
        single_byte("delimiter", &self.delimiter)?;
        single_byte("quote", &self.quote)?;
        if self.newline != "\r\n" {
            single_byte("newline", &self.newline)?;
        }
        Ok(())
    }
}

pub(crate) fn single_byte(name: &str, value: &str) -> Result<u8, ConvertError> {
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(ConvertError::Configuration(format!(
            "{} must be a single byte when quoting is enabled, got {:?}",
            name, value
        ))),
    }
}

/// A builder for [`CsvDialect`]. Every field starts from the default dialect
/// and can be overridden independently.
#[derive(Default)]
pub struct CsvDialectBuilder {
    dialect: CsvDialect,
}

impl CsvDialectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.dialect.delimiter = delimiter.to_string();
        self
    }

    pub fn quote(mut self, quote: &str) -> Self {
        self.dialect.quote = quote.to_string();
        self
    }

    pub fn newline(mut self, newline: &str) -> Self {
        self.dialect.newline = newline.to_string();
        self
    }

    pub fn quote_mode(mut self, quote_mode: QuoteMode) -> Self {
        self.dialect.quote_mode = quote_mode;
        self
    }

    pub fn build(self) -> Result<CsvDialect, ConvertError> {
        self.dialect.validate()?;
        Ok(self.dialect)
    }
}
