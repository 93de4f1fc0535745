//! Contains a collection of useful utility functions.

use std::fs::{read, File};
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::Result;

pub fn read_text_file(file: &Path) -> std::io::Result<String> {
    debug!("reading text file: {:?}", file);
    let mut fd = File::open(file)?;
    let mut content = String::new();
    fd.read_to_string(&mut content)?;

    Ok(content)
}

/// Create a static deser object from given path using serde.
///
/// Format is selected based on the file extension.
pub fn deser_struct_from_path<T>(file_path: &Path) -> Result<T>
where
    for<'de> T: serde::Deserialize<'de>,
{
    let bytes = read(file_path)?;
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    let d: T = match ext.as_str() {
        "toml" => toml::from_slice(&bytes)?,
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yaml::from_slice(&bytes)?,
        _ => return Err(Error::UnsupportedConfigFormat(ext)),
    };
    Ok(d)
}

/// Checks whether the string reads as a numeric literal.
///
/// Words like `inf` or `nan` parse as floats but don't count, at least one
/// digit has to be present.
pub fn is_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit()) && s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_literals() {
        assert!(is_numeric("12"));
        assert!(is_numeric("-3.5"));
        assert!(!is_numeric("counter"));
        assert!(!is_numeric("nan"));
        assert!(!is_numeric("inf"));
    }
}
