//! 验证码图片预处理
//!
//! 固定流程：纠正倾斜 → 裁到字符区域 → 放大 2 倍 → 边缘增强 → 两次中值滤波去噪 → 平滑

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};

/// 验证码固定的倾斜角度（逆时针，度）
pub const SKEW_DEGREES: f32 = 11.0;

/// 字符区域相对图片边缘的留白（左, 上, 右, 下）
const GLYPH_MARGINS: (u32, u32, u32, u32) = (2, 15, 25, 5);

const EDGE_ENHANCE: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0];
const SMOOTH: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let rotated = rotate_about_center(&gray, SKEW_DEGREES);
    let cropped = crop_glyphs(&rotated);

    let (width, height) = cropped.dimensions();
    let upscaled = imageops::resize(&cropped, width * 2, height * 2, FilterType::CatmullRom);

    let edged: GrayImage = imageops::filter3x3(&upscaled, &EDGE_ENHANCE);
    let denoised = median3x3(&median3x3(&edged));
    imageops::filter3x3(&denoised, &SMOOTH)
}

/// 绕中心逆时针旋转，画布大小不变，超出部分填黑
pub fn rotate_about_center(image: &GrayImage, degrees: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        // 目标像素反推回原图坐标
        let sx = cos * dx - sin * dy + cx - 0.5;
        let sy = sin * dx + cos * dy + cy - 0.5;
        Luma([bilinear(image, sx, sy)])
    })
}

fn bilinear(image: &GrayImage, x: f32, y: f32) -> u8 {
    let (width, height) = image.dimensions();
    if x < -0.5 || y < -0.5 || x > width as f32 - 0.5 || y > height as f32 - 0.5 {
        return 0;
    }

    let x0 = x.floor().clamp(0.0, (width - 1) as f32);
    let y0 = y.floor().clamp(0.0, (height - 1) as f32);
    let x1 = (x0 + 1.0).min((width - 1) as f32);
    let y1 = (y0 + 1.0).min((height - 1) as f32);
    let fx = (x - x0).clamp(0.0, 1.0);
    let fy = (y - y0).clamp(0.0, 1.0);

    let at = |px: f32, py: f32| image.get_pixel(px as u32, py as u32)[0] as f32;
    let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
    let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
}

/// 图片太小放不下留白时不裁剪
fn crop_glyphs(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let (left, top, right, bottom) = GLYPH_MARGINS;
    if width <= left + right || height <= top + bottom {
        return image.clone();
    }
    imageops::crop_imm(image, left, top, width - left - right, height - top - bottom).to_image()
}

/// 3×3 中值滤波，边缘像素取最近的邻居
pub fn median3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let mut window = [0u8; 9];
        let mut i = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                window[i] = image.get_pixel(nx, ny)[0];
                i += 1;
            }
        }
        window.sort_unstable();
        Luma([window[4]])
    })
}
