use anyhow::{anyhow, Result};

/// Capture formats accepted from webcams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PixelFormat {
    Rgb24,
    Yuyv,
}

impl PixelFormat {
    pub(crate) fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"RGB3" => Some(Self::Rgb24),
            b"YUYV" => Some(Self::Yuyv),
            _ => None,
        }
    }
}

/// Convert a captured buffer to packed RGB24.
pub(crate) fn to_rgb(pixels: &[u8], width: u32, height: u32, format: PixelFormat) -> Result<Vec<u8>> {
    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
    match format {
        PixelFormat::Rgb24 => {
            let expected = pixel_count * 3;
            if pixels.len() < expected {
                return Err(anyhow!(
                    "RGB frame too short: expected {}, got {}",
                    expected,
                    pixels.len()
                ));
            }
            Ok(pixels[..expected].to_vec())
        }
        PixelFormat::Yuyv => yuyv_to_rgb(pixels, pixel_count),
    }
}

// Drivers may pad the buffer, so only a short buffer is rejected.
fn yuyv_to_rgb(pixels: &[u8], pixel_count: usize) -> Result<Vec<u8>> {
    let expected = pixel_count * 2;
    if pixel_count % 2 != 0 || pixels.len() < expected {
        return Err(anyhow!(
            "YUYV frame length mismatch: expected {}, got {}",
            expected,
            pixels.len()
        ));
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    for chunk in pixels[..expected].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for y in [chunk[0], chunk[2]] {
            let y = y as f32;
            rgb.push(clamp_to_u8(y + 1.402 * v));
            rgb.push(clamp_to_u8(y - 0.344_136 * u - 0.714_136 * v));
            rgb.push(clamp_to_u8(y + 1.772 * u));
        }
    }
    Ok(rgb)
}

fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
