pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed command input from `--input <file>` or piped stdin, in that order.
/// `None` means neither was supplied and the caller should fall back to flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path).map(Some);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
