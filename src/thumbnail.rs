use std::sync::Arc;

/// Decoded still of the loaded video, painted under the ROI overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub size: [usize; 2],
    pub rgba: Arc<Vec<u8>>,
}

impl Thumbnail {
    /// Decode PNG or JPEG bytes into unmultiplied RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let size = [img.width() as usize, img.height() as usize];
        let rgba = img.to_rgba8().into_raw();
        Ok(Self {
            size,
            rgba: Arc::new(rgba),
        })
    }

    pub fn width(&self) -> usize {
        self.size[0]
    }

    pub fn height(&self) -> usize {
        self.size[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let thumb = Thumbnail::decode(&png(4, 3)).unwrap();
        assert_eq!(thumb.size, [4, 3]);
        assert_eq!(thumb.rgba.len(), 4 * 3 * 4);
        assert_eq!(&thumb.rgba[..4], &[200, 10, 10, 255]);
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(Thumbnail::decode(b"<html>not found</html>").is_err());
    }
}
