//! 画布与布局. 所有 [`Rect`] 均使用画布比例坐标, 原点位于左下角.

use image::{Rgba as Pixel, RgbaImage};

use crate::consts::layout;
use crate::overlay::Rgba;

/// 滑块轨道颜色.
const SLIDER_TRACK: Rgba = Rgba::rgb(230, 230, 230);

/// 滑块填充颜色.
const SLIDER_FILL: Rgba = Rgba::rgb(31, 119, 180);

/// 画布尺寸, 单位为英寸.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FigureSize {
    /// 宽.
    pub width: f32,
    /// 高.
    pub height: f32,
}

impl FigureSize {
    /// 直接初始化.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 在给定 dpi 下的像素尺寸 (宽, 高). 每个方向至少 1 像素.
    pub fn pixels(&self, dpi: f32) -> (u32, u32) {
        let px = |inches: f32| {
            let v = (inches * dpi).round();
            if v.is_finite() && v >= 1.0 {
                v as u32
            } else {
                1
            }
        };
        (px(self.width), px(self.height))
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        let (width, height) = layout::DEFAULT_FIGURE_SIZE;
        Self { width, height }
    }
}

/// 画布比例坐标下的矩形. `(x0, y0)` 为左下角.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// 左边界.
    pub x0: f32,
    /// 下边界.
    pub y0: f32,
    /// 宽.
    pub width: f32,
    /// 高.
    pub height: f32,
}

impl Rect {
    /// 直接初始化.
    #[inline]
    pub const fn new(x0: f32, y0: f32, width: f32, height: f32) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// 由四条边界构建.
    #[inline]
    pub fn from_bounds(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self::new(left, bottom, right - left, top - bottom)
    }

    /// 右边界.
    #[inline]
    pub fn x1(&self) -> f32 {
        self.x0 + self.width
    }

    /// 上边界.
    #[inline]
    pub fn y1(&self) -> f32 {
        self.y0 + self.height
    }

    /// 转换为 `w x h` 像素画布上的像素矩形 (左, 上, 宽, 高), 已裁剪到画布之内.
    /// 与画布无交集时返回 `None`.
    pub fn to_pixels(&self, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let (wf, hf) = (w as f32, h as f32);
        let left = (self.x0 * wf).round().clamp(0.0, wf);
        let right = (self.x1() * wf).round().clamp(0.0, wf);
        let top = ((1.0 - self.y1()) * hf).round().clamp(0.0, hf);
        let bottom = ((1.0 - self.y0) * hf).round().clamp(0.0, hf);
        if !(right > left && bottom > top) {
            return None;
        }
        Some((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// 浏览器绘制的目标: 所在画布的尺寸, 以及浏览器在其中占据的区域.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Panel {
    /// 画布尺寸.
    pub figure: FigureSize,
    /// 图像区域.
    pub rect: Rect,
}

impl Panel {
    /// 独占整个画布的单个浏览器. 下方为滑块预留空间.
    pub fn single(figure: FigureSize) -> Self {
        Self {
            figure,
            rect: Rect::from_bounds(
                layout::SINGLE_LEFT,
                layout::SINGLE_BOTTOM,
                layout::SINGLE_RIGHT,
                layout::SINGLE_TOP,
            ),
        }
    }

    /// 将画布等分为 `rows x cols` 个单元, 按行优先顺序返回. 第 0 行位于顶部.
    pub fn grid(figure: FigureSize, rows: usize, cols: usize) -> Vec<Panel> {
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        let (r, c) = (rows as f32, cols as f32);
        let total_w = layout::GRID_RIGHT - layout::GRID_LEFT;
        let total_h = layout::GRID_TOP - layout::GRID_BOTTOM;
        // 间距以单元平均尺寸为单位.
        let cell_w = total_w / (c + layout::GRID_WSPACE * (c - 1.0));
        let cell_h = total_h / (r + layout::GRID_HSPACE * (r - 1.0));
        let step_w = cell_w * (1.0 + layout::GRID_WSPACE);
        let step_h = cell_h * (1.0 + layout::GRID_HSPACE);

        (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let x0 = layout::GRID_LEFT + col as f32 * step_w;
                let y1 = layout::GRID_TOP - row as f32 * step_h;
                Panel {
                    figure,
                    rect: Rect::new(x0, y1 - cell_h, cell_w, cell_h),
                }
            })
            .collect()
    }
}

/// 栅格画布. 白色背景.
#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// 以给定尺寸和 dpi 创建空白画布.
    pub fn new(figure: FigureSize, dpi: f32) -> Self {
        let (w, h) = figure.pixels(dpi);
        Self {
            image: RgbaImage::from_pixel(w, h, Rgba::WHITE.into()),
        }
    }

    /// 像素宽度.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// 像素高度.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 当前画布内容.
    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// 取出画布内容.
    #[inline]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// 将 `src` 等比例缩放 (最近邻采样) 后居中绘制到 `rect` 内.
    /// `frame` 为 `true` 时在图像外围绘制 1 像素黑框.
    pub fn draw_image(&mut self, rect: &Rect, src: &RgbaImage, frame: bool) {
        let Some((bx, by, bw, bh)) = rect.to_pixels(self.width(), self.height()) else {
            return;
        };
        let (sw, sh) = src.dimensions();
        if sw == 0 || sh == 0 {
            return;
        }
        let scale = (bw as f32 / sw as f32).min(bh as f32 / sh as f32);
        let dw = ((sw as f32 * scale).round() as u32).clamp(1, bw);
        let dh = ((sh as f32 * scale).round() as u32).clamp(1, bh);
        let ox = bx + (bw - dw) / 2;
        let oy = by + (bh - dh) / 2;

        for dy in 0..dh {
            let sy = (((dy as f32 + 0.5) * sh as f32 / dh as f32) as u32).min(sh - 1);
            for dx in 0..dw {
                let sx = (((dx as f32 + 0.5) * sw as f32 / dw as f32) as u32).min(sw - 1);
                self.image.put_pixel(ox + dx, oy + dy, *src.get_pixel(sx, sy));
            }
        }
        if frame {
            self.draw_frame(ox, oy, dw, dh);
        }
    }

    /// 在 `rect` 处绘制滑块: 浅灰色轨道, 以及按 `fraction` (截断到 `[0, 1]`) 比例填充的进度.
    pub fn draw_slider(&mut self, rect: &Rect, fraction: f32) {
        let Some((x, y, w, h)) = rect.to_pixels(self.width(), self.height()) else {
            return;
        };
        self.fill(x, y, w, h, SLIDER_TRACK);
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let filled = (w as f32 * fraction).round() as u32;
        self.fill(x, y, filled, h, SLIDER_FILL);
    }

    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let pixel: Pixel<u8> = color.into();
        for py in y..(y + h).min(self.height()) {
            for px in x..(x + w).min(self.width()) {
                self.image.put_pixel(px, py, pixel);
            }
        }
    }

    fn draw_frame(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let black = Rgba::BLACK;
        // 外扩 1 像素, 超出画布的部分直接丢弃.
        let left = x.saturating_sub(1);
        let top = y.saturating_sub(1);
        let right = (x + w).min(self.width() - 1);
        let bottom = (y + h).min(self.height() - 1);
        self.fill(left, top, right - left + 1, 1, black);
        self.fill(left, bottom, right - left + 1, 1, black);
        self.fill(left, top, 1, bottom - top + 1, black);
        self.fill(right, top, 1, bottom - top + 1, black);
    }
}
