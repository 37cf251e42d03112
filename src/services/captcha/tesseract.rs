//! tesseract 命令行 OCR
//!
//! 图片通过 stdin 传入，识别结果从 stdout 读取，不落临时文件

use std::io::Cursor;
use std::process::Stdio;

use image::{GrayImage, ImageFormat};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::CaptchaError;

/// 验证码只包含小写字母和数字
pub const CHAR_WHITELIST: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

pub struct TesseractEngine {
    command: String,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn ocr_failed(&self, message: impl Into<String>) -> CaptchaError {
        CaptchaError::OcrFailed {
            command: self.command.clone(),
            message: message.into(),
        }
    }

    /// 单行模式识别
    pub async fn recognize(&self, image: &GrayImage) -> Result<String, CaptchaError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let whitelist = format!("tessedit_char_whitelist={}", CHAR_WHITELIST);
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "--oem", "3", "--psm", "7"])
            .args(["-c", "load_system_dawg=false", "-c", "load_freq_dawg=false"])
            .args(["-c", whitelist.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.ocr_failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|e| self.ocr_failed(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.ocr_failed(e.to_string()))?;
        if !output.status.success() {
            return Err(self.ocr_failed(format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = first_line(&String::from_utf8_lossy(&output.stdout));
        debug!("OCR 结果: '{}'", text);
        Ok(text)
    }
}

/// 取第一行并去掉首尾空白
pub fn first_line(output: &str) -> String {
    output.lines().next().unwrap_or_default().trim().to_string()
}
