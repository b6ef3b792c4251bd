use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageExportError {
    #[error("la capture d'écran est vide")]
    EmptyCapture,
    #[error("échec d'encodage de l'image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Encode a captured frame to a PNG file. The capture comes from the frame
/// backend (`ViewportCommand::Screenshot`), so what is written is exactly
/// what was rendered.
pub fn save_png(capture: &egui::ColorImage, path: &Path) -> Result<(), ImageExportError> {
    let [width, height] = capture.size;
    if width == 0 || height == 0 {
        return Err(ImageExportError::EmptyCapture);
    }

    let bytes: Vec<u8> = capture.pixels.iter().flat_map(|p| p.to_array()).collect();
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, bytes)
        .ok_or(ImageExportError::EmptyCapture)?;
    buffer.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_decodable_png() {
        let path = std::env::temp_dir().join(format!("roadmap-{}.png", uuid::Uuid::new_v4()));
        let capture = egui::ColorImage::new([4, 3], egui::Color32::from_rgb(10, 20, 30));
        save_png(&capture, &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_capture_is_rejected() {
        let path = std::env::temp_dir().join("roadmap-empty.png");
        let capture = egui::ColorImage::new([0, 0], egui::Color32::BLACK);
        assert!(matches!(
            save_png(&capture, &path),
            Err(ImageExportError::EmptyCapture)
        ));
    }
}
