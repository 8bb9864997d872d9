use bevy::{
    color::ColorToPacked,
    image::TextureAccessError,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages},
};
use thiserror::Error;

/// Side of the square texture each constellation photo is cropped into.
pub const NEON_TEXTURE_SIZE: u32 = 256;

/// Largest accepted side for a neon texture.
pub const MAX_NEON_TEXTURE_SIZE: u32 = 4096;

/// Side of the radial glow textures used by nebulae and the core glow.
pub const GLOW_TEXTURE_SIZE: u32 = 256;

/// Where the source image lands inside the square output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    /// Left edge in output pixels.
    pub x: f32,
    /// Top edge in output pixels.
    pub y: f32,
    /// Drawn width in output pixels.
    pub width: f32,
    /// Drawn height in output pixels.
    pub height: f32,
}

impl FitRect {
    /// Scales a `width` x `height` image to fit a `size` square, preserving
    /// aspect ratio and centering the short axis.
    pub fn aspect_fit(width: u32, height: u32, size: u32) -> Self {
        let size = size as f32;
        let aspect = width as f32 / height as f32;
        if aspect > 1.0 {
            let drawn = size / aspect;
            Self {
                x: 0.0,
                y: (size - drawn) / 2.0,
                width: size,
                height: drawn,
            }
        } else {
            let drawn = size * aspect;
            Self {
                x: (size - drawn) / 2.0,
                y: 0.0,
                width: drawn,
                height: size,
            }
        }
    }

    /// Returns `true` if `point` is inside this rectangle with its corners
    /// rounded by `radius`. The radius is clamped to half the shorter side.
    pub fn contains_rounded(&self, point: Vec2, radius: f32) -> bool {
        let radius = radius.clamp(0.0, self.width.min(self.height) / 2.0);
        let min = Vec2::new(self.x, self.y);
        let max = min + Vec2::new(self.width, self.height);
        if point.cmplt(min).any() || point.cmpgt(max).any() {
            return false;
        }
        let inner_min = min + radius;
        let inner_max = (max - radius).max(inner_min);
        let nearest = point.clamp(inner_min, inner_max);
        point.distance_squared(nearest) <= radius * radius
    }
}

/// Why a photo could not be cropped into a neon texture.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NeonTextureError {
    /// The requested side is zero or above [`MAX_NEON_TEXTURE_SIZE`].
    #[error("neon texture size must be between 1 and {max}, got {0}", max = MAX_NEON_TEXTURE_SIZE)]
    InvalidSize(u32),
    /// The source image has no pixels.
    #[error("image is empty")]
    EmptySource,
    /// The source pixel format cannot be read on the CPU.
    #[error("image cannot be read back: {0}")]
    Unreadable(#[from] TextureAccessError),
}

/// Crops `source` into a `size` x `size` texture with transparent margins.
///
/// The image is aspect-fit and clipped to a rectangle whose corners are rounded
/// by `corner_fraction * size` pixels. Sampling is nearest-neighbour.
pub fn neon_texture(
    source: &Image,
    size: u32,
    corner_fraction: f32,
) -> Result<Image, NeonTextureError> {
    if size == 0 || size > MAX_NEON_TEXTURE_SIZE {
        return Err(NeonTextureError::InvalidSize(size));
    }
    let source_width = source.width();
    let source_height = source.height();
    if source_width == 0 || source_height == 0 {
        return Err(NeonTextureError::EmptySource);
    }

    let fit = FitRect::aspect_fit(source_width, source_height, size);
    let radius = size as f32 * corner_fraction;
    let mut data = Vec::with_capacity(rgba_len(size));

    for y in 0..size {
        for x in 0..size {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if !fit.contains_rounded(center, radius) {
                data.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }

            let u = ((center.x - fit.x) / fit.width).clamp(0.0, 1.0);
            let v = ((center.y - fit.y) / fit.height).clamp(0.0, 1.0);
            let sx = ((u * source_width as f32) as u32).min(source_width - 1);
            let sy = ((v * source_height as f32) as u32).min(source_height - 1);

            let color = source.get_color_at(sx, sy)?.to_srgba();
            data.extend_from_slice(&color.to_u8_array());
        }
    }

    Ok(square_texture(size, data))
}

/// Bakes a radial gradient from `color` at the center to fully transparent at
/// the inscribed circle.
pub fn glow_texture(color: Color, size: u32) -> Image {
    let size = size.max(1);
    let color = color.to_srgba();
    let half = size as f32 / 2.0;
    let mut data = Vec::with_capacity(rgba_len(size));

    for y in 0..size {
        for x in 0..size {
            let offset = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half);
            let falloff = 1.0 - (offset.length() / half).clamp(0.0, 1.0);
            let texel = Srgba::new(
                color.red * falloff,
                color.green * falloff,
                color.blue * falloff,
                color.alpha * falloff,
            );
            data.extend_from_slice(&texel.to_u8_array());
        }
    }

    square_texture(size, data)
}

fn rgba_len(size: u32) -> usize {
    let side = size as usize;
    side * side * 4
}

fn square_texture(size: u32, data: Vec<u8>) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        default(),
    );
    image.texture_descriptor.usage = TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST;
    image
}
