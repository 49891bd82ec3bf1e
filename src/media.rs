use std::cmp::max;

use face_core::{DrawCommand, FaceError, Frame};
use image::imageops::FilterType;
use image::{imageops, Rgba, RgbaImage};

/// Decode icon bytes and scale them to fit in a `size` square.
///
/// A size of zero keeps the original dimensions.
pub fn decode_icon(bytes: &[u8], size: u32) -> face_core::Result<RgbaImage> {
    if bytes.is_empty() {
        return Err(FaceError::DecodeFailure("empty asset".into()));
    }
    let image = image::load_from_memory(bytes)?.to_rgba8();
    if size == 0 || (image.width() <= size && image.height() <= size) {
        return Ok(image);
    }
    Ok(resize_to_fit(&image, size, size))
}

/// Scale down preserving aspect ratio so both sides fit
pub fn resize_to_fit(image: &RgbaImage, nwidth: u32, nheight: u32) -> RgbaImage {
    let (width, height) = resize_dimensions(image.width(), image.height(), nwidth, nheight, false);
    imageops::resize(image, width, height, FilterType::Gaussian)
}

/// https://docs.rs/image/0.25.5/src/image/math/utils.rs.html#12
pub fn resize_dimensions(
    width: u32,
    height: u32,
    nwidth: u32,
    nheight: u32,
    fill: bool,
) -> (u32, u32) {
    let wratio = f64::from(nwidth) / f64::from(width);
    let hratio = f64::from(nheight) / f64::from(height);

    let ratio = if fill {
        f64::max(wratio, hratio)
    } else {
        f64::min(wratio, hratio)
    };

    let nw = max((f64::from(width) * ratio).round() as u64, 1);
    let nh = max((f64::from(height) * ratio).round() as u64, 1);

    if nw > u64::from(u32::MAX) {
        let ratio = f64::from(u32::MAX) / f64::from(width);
        (u32::MAX, max((f64::from(height) * ratio).round() as u32, 1))
    } else if nh > u64::from(u32::MAX) {
        let ratio = f64::from(u32::MAX) / f64::from(height);
        (max((f64::from(width) * ratio).round() as u32, 1), u32::MAX)
    } else {
        (nw as u32, nh as u32)
    }
}

/// Paint the raster parts of a frame (fills and icons).
///
/// Text has no font to rasterize with and is skipped.
pub fn rasterize(frame: &Frame) -> RgbaImage {
    let mut buf = RgbaImage::new(frame.width, frame.height);
    for command in &frame.commands {
        match command {
            DrawCommand::Fill { color } => {
                let [r, g, b, a] = *color;
                let a = a as f64 / 255.0;
                let ba = 1. - a;
                for p in buf.pixels_mut() {
                    // Mix fill against what is already there
                    let [pr, pg, pb, _] = p.0;
                    *p = Rgba([
                        ((pr as f64 * ba) + (r as f64 * a)) as u8,
                        ((pg as f64 * ba) + (g as f64 * a)) as u8,
                        ((pb as f64 * ba) + (b as f64 * a)) as u8,
                        0xff,
                    ]);
                }
            },
            DrawCommand::Icon { icon, x, y } => {
                imageops::overlay(&mut buf, &**icon, *x as i64, *y as i64);
            },
            DrawCommand::Text { .. } => {},
        }
    }
    buf
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use image::ImageFormat;

    use super::*;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decodes_and_scales_icons() {
        let icon = decode_icon(&png_bytes(96, 48), 48).unwrap();
        assert_eq!(icon.dimensions(), (48, 24));

        let icon = decode_icon(&png_bytes(16, 16), 48).unwrap();
        assert_eq!(icon.dimensions(), (16, 16));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        assert!(matches!(
            decode_icon(b"definitely not a png", 48),
            Err(FaceError::DecodeFailure(_))
        ));
        assert!(matches!(decode_icon(&[], 48), Err(FaceError::DecodeFailure(_))));
    }

    #[test]
    fn rasterizes_fills_and_icons() {
        let icon = Arc::new(RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])));
        let frame = Frame {
            width: 8,
            height: 8,
            commands: vec![
                DrawCommand::Fill {
                    color: [0, 0, 255, 255],
                },
                DrawCommand::Icon { icon, x: 3., y: 4. },
            ],
        };
        let buf = rasterize(&frame);
        assert_eq!(buf.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(buf.get_pixel(3, 4).0, [0, 255, 0, 255]);
        assert_eq!(buf.get_pixel(5, 4).0, [0, 0, 255, 255]);
    }
}
