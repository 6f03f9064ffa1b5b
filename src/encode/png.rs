use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{
    foundation::error::{SegmaskError, SegmaskResult},
    render::compositor::MaskSurface,
};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Lossless PNG encoding of `surface`.
pub fn encode_png(surface: &MaskSurface) -> SegmaskResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(surface.width, surface.height, surface.data.clone())
        .ok_or_else(|| SegmaskError::render("surface buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode mask png")?;
    Ok(buf)
}

/// `data:image/png;base64,...` URL of `surface`, as submitted with a mask.
pub fn png_data_url(surface: &MaskSurface) -> SegmaskResult<String> {
    let png = encode_png(surface)?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(png)))
}

pub fn write_png(surface: &MaskSurface, path: &Path) -> SegmaskResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &surface.data,
        surface.width,
        surface.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Decode PNG bytes back into a surface, e.g. to compare against a reference mask.
pub fn decode_png(bytes: &[u8]) -> SegmaskResult<MaskSurface> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .context("decode mask png")?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(MaskSurface {
        width,
        height,
        data: img.into_raw(),
    })
}

pub fn decode_data_url(url: &str) -> SegmaskResult<MaskSurface> {
    let encoded = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| SegmaskError::serde("expected a base64 PNG data URL"))?;
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| SegmaskError::serde(format!("invalid base64 in data URL: {e}")))?;
    decode_png(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
