//! Delivery of the snapshot artifact.
//!
//! Headless environments have no platform share sheet, so the share flow
//! resolves to its downloadable-file arm: the PNG is written where the
//! caller can hand it off (filesystem, upload staging directory).

use std::path::Path;

/// Write PNG bytes to a file.
pub fn export_png(png_data: &[u8], path: &Path) -> std::io::Result<()> {
    std::fs::write(path, png_data)?;
    log::info!("snapshot written to {} ({} bytes)", path.display(), png_data.len());
    Ok(())
}

/// Default artifact file name for a composition.
pub fn suggested_file_name(composition_name: &str) -> String {
    let stem: String = composition_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "keyring.png".to_string()
    } else {
        format!("{stem}.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name("My Keyring"), "my-keyring.png");
        assert_eq!(suggested_file_name("***"), "keyring.png");
        assert_eq!(suggested_file_name(""), "keyring.png");
    }
}
