//! 基于 opencv 窗口的交互式显示宿主, 主要用于调试.
//!
//! # 注意
//!
//! 需要 `plot` feature.

use image::RgbaImage;
use opencv::core::{Mat, Scalar, Size, Vec3b, CV_8UC3};
use opencv::highgui::{
    create_trackbar, destroy_window, get_trackbar_pos, imshow, named_window, set_trackbar_pos, wait_key,
    WINDOW_AUTOSIZE,
};
use opencv::prelude::*;
use std::time::Duration;

use super::{Environment, Viewer};

/// 宿主窗口中的滑块名.
const TRACKBAR: &str = "Slice";

/// 表明一个可以在窗口中可视化的对象.
pub trait ImgDisplay {
    /// 在名为 `title` 的窗口中展示对象.
    fn show(&self, title: &str) -> opencv::Result<()>;

    /// 同 `show()`, 但在之后自动等待一次用户按键输入.
    fn show_and_wait(&self, title: &str) -> opencv::Result<i32> {
        self.show(title)?;
        wait_key(0)
    }

    /// 同 `show()`, 但在之后自动等待给定时间.
    fn show_and_wait_for(&self, title: &str, d: Duration) -> opencv::Result<i32> {
        self.show(title)?;
        wait_key(d.as_millis().min(i32::MAX as u128) as i32)
    }
}

/// 转换为 BGR 三通道矩阵. alpha 通道被丢弃.
fn rgba_to_opencv_mat(image: &RgbaImage) -> opencv::Result<Mat> {
    let (w, h) = image.dimensions();
    let mut mat = Mat::new_size_with_default(Size::new(w as i32, h as i32), CV_8UC3, Scalar::from(0))?;
    for (x, y, p) in image.enumerate_pixels() {
        let [r, g, b, _] = p.0;
        *mat.at_2d_mut::<Vec3b>(y as i32, x as i32)? = Vec3b::from([b, g, r]);
    }
    Ok(mat)
}

impl ImgDisplay for RgbaImage {
    fn show(&self, title: &str) -> opencv::Result<()> {
        imshow(title, &rgba_to_opencv_mat(self)?)
    }
}

/// 确保浏览器已显示并已呈现, 返回滑块的起始位置. 浏览器无法显示时返回 `None`.
fn prepare_host(viewer: &mut Viewer) -> Option<i32> {
    if !viewer.is_displayed() {
        if let Err(e) = viewer.display(None, viewer.index(), false) {
            log::error!("无法显示 `{}`: {e}", viewer.title());
            return None;
        }
    }
    // 调用方可能以 `show = false` 显示过, 此时尚未呈现.
    viewer.present();
    Some(viewer.index().min(i32::MAX as usize) as i32)
}

/// 打开窗口, 以 trackbar 作为滑块驱动浏览器, 直到用户按下 `Esc` 或 `q`.
///
/// 浏览器必须处于交互环境; 否则直接返回. 滑块回调即 [`Viewer::slider_input`].
/// 滑块从浏览器当前所在的层开始.
pub fn run_interactive(viewer: &mut Viewer) -> opencv::Result<()> {
    if viewer.config().environment != Environment::Interactive {
        log::warn!("`{}` 不处于交互环境, 忽略", viewer.title());
        return Ok(());
    }
    let Some(start) = prepare_host(viewer) else {
        return Ok(());
    };

    let title = viewer.title();
    named_window(&title, WINDOW_AUTOSIZE)?;
    let max = viewer.extent().saturating_sub(1).min(i32::MAX as usize) as i32;
    create_trackbar(TRACKBAR, &title, None, max, None)?;
    set_trackbar_pos(TRACKBAR, &title, start)?;
    if let Some(frame) = viewer.presented() {
        frame.show(&title)?;
    }

    let mut last = Some(start);
    loop {
        let pos = get_trackbar_pos(TRACKBAR, &title)?;
        if last != Some(pos) {
            if let Err(e) = viewer.slider_input(pos as f64) {
                log::warn!("忽略滑块输入 {pos}: {e}");
            }
            last = Some(pos);
            if let Some(frame) = viewer.presented() {
                frame.show(&title)?;
            }
        }
        let key = wait_key(30)?;
        if key == 27 || key == 'q' as i32 {
            break;
        }
    }
    destroy_window(&title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::ViewerConfig;
    use crate::Volume;
    use ndarray::Array;

    fn interactive_viewer() -> Viewer {
        let volume = Volume::new(
            Array::from_iter((0..48).map(|v| v as f32))
                .into_shape((4, 3, 4))
                .unwrap(),
        );
        let config = ViewerConfig::default()
            .with_figure_size(1.0, 1.0)
            .with_dpi(20.0)
            .with_environment(Environment::Interactive);
        Viewer::with_config(volume, 0, config).unwrap()
    }

    #[test]
    fn test_prepare_host_after_silent_display() {
        let mut viewer = interactive_viewer();
        viewer.display(None, 2, false).unwrap();
        assert!(viewer.presented().is_none());

        assert_eq!(prepare_host(&mut viewer), Some(2));
        assert_eq!(viewer.index(), 2);
        let first = viewer.presented().unwrap().clone();
        assert_eq!(first, viewer.render_figure(20.0).unwrap());

        // 之后的滑块输入同步更新呈现的画面.
        viewer.slider_input(3.0).unwrap();
        assert_ne!(viewer.presented().unwrap(), &first);
    }

    #[test]
    fn test_prepare_host_displays_lazily() {
        let mut viewer = interactive_viewer();
        assert_eq!(prepare_host(&mut viewer), Some(0));
        assert!(viewer.is_displayed());
        assert!(viewer.presented().is_some());
    }
}
