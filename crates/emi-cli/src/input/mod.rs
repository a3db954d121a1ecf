pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed input from `--input <file>` if given, otherwise from piped stdin.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(file::read_json(p)?)),
        None => stdin::read_stdin(),
    }
}
