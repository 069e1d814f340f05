//! 动画与静态帧的编码输出.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ExportError;

/// 一次导出的结果. 编码失败不会向上传播, 而是记录在 `error` 中.
#[derive(Debug)]
pub struct ExportReport {
    /// 目标路径.
    pub path: PathBuf,
    /// 渲染的帧数.
    pub frames: usize,
    /// 帧间隔.
    pub interval: Duration,
    /// 编码错误 (若有).
    pub error: Option<ExportError>,
}

impl ExportReport {
    /// 是否成功写出?
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// 由帧率求帧间隔 (`1000 / fps` 毫秒). 帧率非正, 非有限或帧间隔超出 [`Duration`] 范围时返回 `None`.
pub(crate) fn frame_interval(fps: f32) -> Option<Duration> {
    if !fps.is_finite() || fps <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / fps as f64).ok()
}

/// 将帧序列编码为无限循环的 gif 动画. 目前只支持 `.gif` 扩展名.
pub(crate) fn encode_animation<I>(path: &Path, frames: I, interval: Duration) -> Result<(), ExportError>
where
    I: IntoIterator<Item = RgbaImage>,
{
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if !is_gif {
        return Err(ExportError::UnsupportedFormat(path.to_path_buf()));
    }

    let mut frames = frames.into_iter().peekable();
    if frames.peek().is_none() {
        return Err(ExportError::NoFrames);
    }

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite)?;
    let delay = Delay::from_saturating_duration(interval);
    encoder.encode_frames(frames.map(|buf| Frame::from_parts(buf, 0, 0, delay)))?;
    Ok(())
}

/// 写出单帧静态图像. 格式由扩展名推断.
pub(crate) fn encode_still(path: &Path, image: &RgbaImage) -> Result<(), ExportError> {
    image.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::AnimationDecoder;

    fn frames(n: usize) -> Vec<RgbaImage> {
        (0..n)
            .map(|i| RgbaImage::from_pixel(4, 3, image::Rgba([i as u8 * 40, 0, 0, 255])))
            .collect()
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(10.0), Some(Duration::from_millis(100)));
        assert_eq!(frame_interval(4.0), Some(Duration::from_millis(250)));
        assert_eq!(frame_interval(0.0), None);
        assert_eq!(frame_interval(f32::NAN), None);
        assert_eq!(frame_interval(1e-30), None);
    }

    #[test]
    fn test_encode_gif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        encode_animation(&path, frames(3), Duration::from_millis(100)).unwrap();

        let file = std::io::BufReader::new(File::open(&path).unwrap());
        let decoder = image::codecs::gif::GifDecoder::new(file).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].buffer().dimensions(), (4, 3));
    }

    #[test]
    fn test_encode_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            encode_animation(&dir.path().join("a.mp4"), frames(2), Duration::from_millis(10)),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            encode_animation(&dir.path().join("a.gif"), frames(0), Duration::from_millis(10)),
            Err(ExportError::NoFrames)
        ));
        assert!(matches!(
            encode_animation(
                &dir.path().join("missing").join("a.gif"),
                frames(1),
                Duration::from_millis(10)
            ),
            Err(ExportError::Io(_))
        ));
    }

    #[test]
    fn test_encode_still() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        encode_still(&path, &frames(2)[1]).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.get_pixel(0, 0), &image::Rgba([40, 0, 0, 255]));
    }
}
