use std::{fs, path::Path};

use encoding_rs::Encoding;
use log::{debug, warn};

/// Resolves the content of a `.cpg` file to a text encoding.
///
/// Accepts WHATWG labels (`UTF-8`, `ISO-8859-1`, `windows-1252`, ...) as well
/// as the bare code page numbers ESRI tools write (`1252`, `ANSI 1252`,
/// `88591`).
///
/// # Examples
///
/// ```
/// use geoshape_csv::item::shapefile::code_page::encoding_for_label;
///
/// assert_eq!(encoding_for_label("UTF-8"), Some(encoding_rs::UTF_8));
/// assert_eq!(encoding_for_label("ANSI 1252"), Some(encoding_rs::WINDOWS_1252));
/// assert_eq!(encoding_for_label("klingon"), None);
/// ```
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
        return Some(encoding);
    }

    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let candidate = match digits.strip_prefix("8859") {
        Some(part) if !part.is_empty() => format!("iso-8859-{}", part),
        _ => format!("windows-{}", digits),
    };
    Encoding::for_label(candidate.as_bytes())
        .or_else(|| Encoding::for_label(format!("cp{}", digits).as_bytes()))
}

/// Reads the `.cpg` file at `path`, if any.
///
/// A missing file yields `None`. An unreadable file or an unknown label is
/// logged and yields `None` too, leaving the table decoded as UTF-8.
pub fn read_code_page(path: &Path) -> Option<&'static Encoding> {
    let label = match fs::read_to_string(path) {
        Ok(label) => label,
        Err(error) => {
            if path.exists() {
                warn!("Unable to read code page {}: {}", path.display(), error);
            }
            return None;
        }
    };

    let encoding = encoding_for_label(&label);
    match encoding {
        Some(encoding) => {
            debug!("Code page {} resolved to {}", path.display(), encoding.name())
        }
        None => warn!("Unknown code page {:?} in {}", label.trim(), path.display()),
    }
    encoding
}
