//! 切片的持久化存储.

use super::VolumeSlice;
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 图像不会按原样保存: 浮点强度值经由切片携带的强度窗口映射为 8-bit 灰度,
/// 因此同一体数据的不同切片保存后亮度可直接比较.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径. 格式由扩展名决定.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

impl ImgWriteVis for VolumeSlice<'_> {
    /// 非有限值 (NaN, inf) 保存为黑色.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let window = self.window();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.indexed_iter() {
            let gray = window.eval(v).unwrap_or(crate::consts::gray::BLACK);
            buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
        }
        buf.save(path)
    }
}
