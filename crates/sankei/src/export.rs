use crate::Figure;
use std::path::Path;

/// Raster exports are always written at 3× the canvas resolution.
pub const RASTER_SCALE: f32 = 3.0;

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("cannot infer export format from extension: {extension:?}")]
    UnsupportedFormat { extension: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Svg,
    Png,
    Jpeg,
    Pdf,
}

fn infer_format(path: &Path) -> Result<ExportFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "svg" => Ok(ExportFormat::Svg),
        "png" => Ok(ExportFormat::Png),
        "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
        "pdf" => Ok(ExportFormat::Pdf),
        _ => Err(ExportError::UnsupportedFormat { extension }),
    }
}

impl Figure {
    /// Writes the figure to `path`, inferring the format from the file
    /// extension (`.svg`, `.png`, `.jpg`/`.jpeg`, `.pdf`). Raster formats are
    /// rendered at [`RASTER_SCALE`] over a white background.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = infer_format(path)?;
        tracing::debug!(?format, path = %path.display(), "exporting figure");
        let bytes = match format {
            ExportFormat::Svg => self.svg().as_bytes().to_vec(),
            ExportFormat::Png => svg_to_png(self.svg())?,
            ExportFormat::Jpeg => svg_to_jpeg(self.svg())?,
            ExportFormat::Pdf => svg_to_pdf(self.svg())?,
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

pub fn svg_to_png(svg: &str) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, RASTER_SCALE)?;
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, RASTER_SCALE)?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // The pixmap is RGBA8 over an opaque white fill, so the alpha channel is
    // always 255 and can be dropped.
    let rgba = pixmap.data();
    let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
    for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst[0] = src[0];
        dst[1] = src[1];
        dst[2] = src[2];
    }

    let mut out = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| ExportError::JpegEncode)?;
    Ok(out)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| ExportError::PdfConvert)
}

fn svg_to_pixmap(svg: &str, scale: f32) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;

    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width_px, height_px).ok_or(ExportError::PixmapAlloc)?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dataset, DiagramOptions, build_diagram};

    fn sample_figure() -> Figure {
        let mut data = Dataset::new();
        data.push_filled_column("Stage1", ["A", "A", "A", "A", "B", "B"])
            .unwrap();
        data.push_filled_column("Stage2", ["X", "X", "X", "Y", "X", "X"])
            .unwrap();
        data.push_filled_column("Id", ["1", "2", "3", "4", "5", "6"])
            .unwrap();
        build_diagram(
            &data,
            &["Stage1", "Stage2"],
            "Id",
            &DiagramOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn svg_to_png_produces_png_signature() {
        let bytes = svg_to_png(sample_figure().svg()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn svg_to_jpeg_produces_jpeg_signature() {
        let bytes = svg_to_jpeg(sample_figure().svg()).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn svg_to_pdf_produces_pdf_signature() {
        let bytes = svg_to_pdf(sample_figure().svg()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn raster_is_canvas_times_scale() {
        let pixmap = svg_to_pixmap(sample_figure().svg(), RASTER_SCALE).unwrap();
        assert_eq!(pixmap.width(), 3000);
        assert_eq!(pixmap.height(), 1800);
    }

    #[test]
    fn save_infers_format_from_extension() {
        let figure = sample_figure();
        let dir = std::env::temp_dir();

        let svg_path = dir.join("sankei_export_test.svg");
        figure.save(&svg_path).unwrap();
        let written = std::fs::read_to_string(&svg_path).unwrap();
        assert_eq!(written, figure.svg());
        std::fs::remove_file(&svg_path).ok();

        let png_path = dir.join("sankei_export_test.png");
        figure.save(&png_path).unwrap();
        let bytes = std::fs::read(&png_path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        std::fs::remove_file(&png_path).ok();
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = sample_figure()
            .save(std::env::temp_dir().join("diagram.bmp"))
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedFormat { extension } if extension == "bmp"
        ));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = sample_figure()
            .save(std::env::temp_dir().join("diagram"))
            .unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(
            infer_format(Path::new("out.PNG")).unwrap(),
            ExportFormat::Png
        );
        assert_eq!(
            infer_format(Path::new("out.JpEg")).unwrap(),
            ExportFormat::Jpeg
        );
    }
}
