//! Output artifact naming: `<sanitized-official-name>_<YYYYMMDD_HHMMSS>.<ext>`.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// Any run of characters outside `[A-Za-z0-9]`.
static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("non-alnum regex"));

const SEPARATOR: &str = "_";
const TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Replace every run of non-alphanumeric characters with a single `_`.
pub fn sanitize_name(name: &str) -> String {
    NON_ALNUM_RE.replace_all(name.trim(), SEPARATOR).into_owned()
}

pub fn report_filename(official_name: &str, timestamp: &NaiveDateTime, extension: &str) -> String {
    format!(
        "{}_{}.{extension}",
        sanitize_name(official_name),
        timestamp.format(TIMESTAMP)
    )
}
