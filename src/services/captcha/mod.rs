//! 验证码识别服务 - 业务能力层
//!
//! 默认实现约 65%~70% 的识别率，识别错误时登录表单会重新出现，
//! 调用方必须准备好重试；也可以换成人工输入或更准确的模型

pub mod preprocess;
pub mod tesseract;

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::CaptchaError;

pub use preprocess::preprocess;
pub use tesseract::TesseractEngine;

/// 验证码识别能力：图片 → 文字
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    async fn solve(&self, image: &DynamicImage) -> Result<String, CaptchaError>;
}

/// 默认识别器：固定预处理 + tesseract
pub struct TesseractSolver {
    engine: TesseractEngine,
}

impl TesseractSolver {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            engine: TesseractEngine::new(command),
        }
    }
}

#[async_trait]
impl CaptchaSolver for TesseractSolver {
    async fn solve(&self, image: &DynamicImage) -> Result<String, CaptchaError> {
        let prepared = preprocess(image);
        self.engine.recognize(&prepared).await
    }
}

/// 把普通函数包装成识别器
///
/// ```ignore
/// let solver = SolverFn(|_image: &DynamicImage| ask_user_for_captcha());
/// ```
pub struct SolverFn<F>(pub F);

#[async_trait]
impl<F> CaptchaSolver for SolverFn<F>
where
    F: Fn(&DynamicImage) -> String + Send + Sync,
{
    async fn solve(&self, image: &DynamicImage) -> Result<String, CaptchaError> {
        Ok((self.0)(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[tokio::test]
    async fn test_solver_fn_passes_image_through() {
        let solver = SolverFn(|image: &DynamicImage| format!("{}x{}", image.width(), image.height()));
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(7, 3, Luma([0])));
        assert_eq!(solver.solve(&image).await.unwrap(), "7x3");
    }
}
