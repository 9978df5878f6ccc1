use std::io::Cursor;

use image::ImageReader;

use crate::error::FetchError;

/// Read an image's pixel dimensions from its header without decoding it.
pub fn probe_dimensions(bytes: &[u8]) -> crate::Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(FetchError::Decode("unrecognised image format".into()));
    }
    reader
        .into_dimensions()
        .map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn reads_png_header() {
        assert_eq!(probe_dimensions(&png(7, 3)).unwrap(), (7, 3));
    }

    #[test]
    fn rejects_non_images() {
        let err = probe_dimensions(b"<html>not found</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn rejects_truncated_image() {
        let bytes = png(4, 4);
        assert!(probe_dimensions(&bytes[..12]).is_err());
    }
}
