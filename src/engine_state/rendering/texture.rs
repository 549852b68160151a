//! Texture handling for the rendering pipeline.
//!
//! This module provides the depth buffer, the material atlas texture, and the
//! procedural painter that draws the atlas image.

use image::{Rgba, RgbaImage};
use wgpu::util::DeviceExt;

use super::material::{AtlasColumn, TextureAtlas};
use crate::engine_state::voxels::block::block_type::BlockType;

/// Represents a GPU texture with associated view and sampler.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for depth buffers.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a new depth texture matching the surface size.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The surface configuration containing dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads an sRGB image as a sampled texture with nearest filtering.
    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage, label: &str) -> Self {
        let (width, height) = image.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Colour of the magenta half of the missing tile.
pub const MISSING_COLOR: [u8; 3] = [255, 0, 255];

/// Base colours of a material's top, bottom and side tiles.
fn material_colors(block_type: BlockType) -> [[u8; 3]; 3] {
    const DIRT: [u8; 3] = [121, 85, 58];
    match block_type {
        BlockType::SAND => [[219, 204, 140]; 3],
        BlockType::GRASS => [[96, 160, 64], DIRT, [110, 120, 60]],
        BlockType::DIRT => [DIRT; 3],
        BlockType::STONE => [[128, 128, 128]; 3],
        BlockType::SNOW => [[242, 244, 250]; 3],
        BlockType::LEAVES => [[56, 120, 40]; 3],
        BlockType::WOOD => [[156, 120, 72], [156, 120, 72], [102, 72, 40]],
        BlockType::AIR => [MISSING_COLOR; 3],
    }
}

/// Paints the material atlas.
///
/// Row 0 is a magenta and black checker for IDs without a material; every
/// palette material gets its own row with per-pixel brightness speckle so
/// flat faces still read as textured.
pub fn build_atlas_image(atlas: &TextureAtlas) -> RgbaImage {
    let (width, height) = atlas.dimensions();
    let tile = atlas.tile_size();
    let mut image = RgbaImage::new(width, height);

    for column in [AtlasColumn::Top, AtlasColumn::Bottom, AtlasColumn::Side] {
        let x0 = column as u32 * tile;
        for y in 0..tile {
            for x in 0..tile {
                let checker = ((x * 2 / tile) + (y * 2 / tile)) % 2 == 0;
                let [r, g, b] = if checker { MISSING_COLOR } else { [0, 0, 0] };
                image.put_pixel(x0 + x, y, Rgba([r, g, b, 255]));
            }
        }
    }

    for block_type in BlockType::PALETTE {
        let row = u32::from(block_type.id());
        let colors = material_colors(block_type);
        let mut rng = fastrand::Rng::with_seed(u64::from(row));
        for column in [AtlasColumn::Top, AtlasColumn::Bottom, AtlasColumn::Side] {
            let base = colors[column as usize];
            for y in 0..tile {
                for x in 0..tile {
                    let shade = 0.85 + rng.f32() * 0.15;
                    let [r, g, b] = base.map(|channel| (f32::from(channel) * shade) as u8);
                    image.put_pixel(column as u32 * tile + x, row * tile + y, Rgba([r, g, b, 255]));
                }
            }
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_image_matches_layout() {
        let atlas = TextureAtlas::new(8);
        let image = build_atlas_image(&atlas);
        assert_eq!(image.dimensions(), atlas.dimensions());
    }

    #[test]
    fn test_missing_tile_is_checkered() {
        let atlas = TextureAtlas::new(8);
        let image = build_atlas_image(&atlas);
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 255, 255]);
        assert_eq!(image.get_pixel(4, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_painting_is_deterministic() {
        let atlas = TextureAtlas::default();
        assert_eq!(build_atlas_image(&atlas), build_atlas_image(&atlas));
    }

    #[test]
    fn test_grass_top_is_greener_than_side() {
        let atlas = TextureAtlas::new(4);
        let image = build_atlas_image(&atlas);
        let row = u32::from(BlockType::GRASS.id()) * 4;
        let top = image.get_pixel(0, row).0;
        let bottom = image.get_pixel(4, row).0;
        assert!(top[1] > top[0]);
        assert!(bottom[0] > bottom[1]);
    }
}
