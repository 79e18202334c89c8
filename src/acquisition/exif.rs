use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 撮影日時（ギャラリー一覧の表示用）
pub fn capture_date(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;

    [exif::Tag::DateTimeOriginal, exif::Tag::DateTime]
        .into_iter()
        .find_map(|tag| exif.get_field(tag, exif::In::PRIMARY))
        .map(|field| field.display_value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_exif_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        assert!(capture_date(&path).is_none());
        assert!(capture_date(&dir.path().join("missing.jpg")).is_none());
    }
}
