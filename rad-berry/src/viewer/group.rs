//! 浏览器组: 以固定网格排列多个浏览器, 并同步驱动它们的切片位置.

use image::RgbaImage;
use std::path::Path;
use std::time::Duration;

use super::{export, Environment, ExportReport, Viewer};
use crate::consts::layout;
use crate::error::{SliceError, SliceResult};
use crate::render::{Canvas, FigureSize, Panel};

/// 浏览器组. 只聚合成员, 从不共享成员状态.
#[derive(Clone, Debug)]
pub struct ViewerGroup {
    members: Vec<Viewer>,
    rows: usize,
    cols: usize,
    presented: Option<RgbaImage>,
}

impl ViewerGroup {
    /// 创建浏览器组. `rows * cols` 与成员个数不符时返回 [`SliceError::GridMismatch`].
    pub fn new(members: Vec<Viewer>, rows: usize, cols: usize) -> SliceResult<Self> {
        if rows.checked_mul(cols) != Some(members.len()) {
            return Err(SliceError::GridMismatch {
                rows,
                cols,
                count: members.len(),
            });
        }
        Ok(Self {
            members,
            rows,
            cols,
            presented: None,
        })
    }

    /// 行数.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 列数.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 成员, 按行优先顺序.
    #[inline]
    pub fn members(&self) -> &[Viewer] {
        &self.members
    }

    /// 第 `pos` 个成员.
    #[inline]
    pub fn member_mut(&mut self, pos: usize) -> Option<&mut Viewer> {
        self.members.get_mut(pos)
    }

    /// 取回全部成员.
    #[inline]
    pub fn into_members(self) -> Vec<Viewer> {
        self.members
    }

    /// 最近一次呈现的整组画面 (仅当有成员处于交互环境时).
    #[inline]
    pub fn presented(&self) -> Option<&RgbaImage> {
        self.presented.as_ref()
    }

    /// 共享画布尺寸: 宽为 `cols` 乘以成员宽度之和, 高同理.
    pub fn figure_size(&self) -> FigureSize {
        let (w, h) = self.members.iter().fold((0.0, 0.0), |(w, h), m| {
            let fig = m.config().figure_size;
            (w + fig.width, h + fig.height)
        });
        FigureSize::new(self.cols as f32 * w, self.rows as f32 * h)
    }

    fn dpi(&self) -> f32 {
        self.members
            .first()
            .map_or(layout::DEFAULT_DPI, |m| m.config().dpi)
    }

    /// 显示整组. 各成员按行优先顺序绑定到网格单元, 全部就绪后统一呈现一次.
    ///
    /// 任何成员不满足显示条件 (维数, 索引) 时返回错误, 且不显示任何成员.
    pub fn display(&mut self, initial_index: usize) -> SliceResult<()> {
        for m in &self.members {
            let rank = m.volume().rank();
            if rank != 3 {
                return Err(SliceError::UnsupportedRank(rank));
            }
            m.controller().check(initial_index.try_into().unwrap_or(i64::MAX))?;
        }
        let panels = Panel::grid(self.figure_size(), self.rows, self.cols);
        for (m, panel) in self.members.iter_mut().zip(panels) {
            m.display(Some(panel), initial_index, false)?;
        }
        log::info!("显示 {}x{} 浏览器组", self.rows, self.cols);
        self.present();
        Ok(())
    }

    /// 以给定 dpi 渲染整组画布.
    pub fn render(&self, dpi: f32) -> RgbaImage {
        let mut canvas = Canvas::new(self.figure_size(), dpi);
        for m in &self.members {
            m.draw_into(&mut canvas);
        }
        canvas.into_image()
    }

    /// 以给定 dpi 写出整组画布的静态图像. 编码错误记录在报告中而非向上传播.
    pub fn save_figure(&self, path: impl AsRef<Path>, dpi: f32) -> ExportReport {
        let path = path.as_ref();
        let error = export::encode_still(path, &self.render(dpi)).err();
        match &error {
            Some(e) => log::error!("保存浏览器组到 {path:?} 失败: {e}"),
            None => log::info!("保存浏览器组到 {path:?}"),
        }
        ExportReport {
            path: path.to_path_buf(),
            frames: 1,
            interval: Duration::ZERO,
            error,
        }
    }

    /// 将切片位置同步到全部成员. 先检查全部成员, 任一越界则不修改任何成员.
    pub fn set_index(&mut self, index: usize) -> SliceResult<()> {
        for m in &self.members {
            m.controller().check(index.try_into().unwrap_or(i64::MAX))?;
        }
        for m in &mut self.members {
            m.set_index(index)?;
        }
        if self.presented.is_some() {
            self.present();
        }
        Ok(())
    }

    /// 修改全部成员的滑块下移量.
    pub fn set_slider_gap(&mut self, gap: f32) {
        self.members.iter_mut().for_each(|m| m.set_slider_gap(gap));
    }

    /// 修改全部成员的滑块高度.
    pub fn set_slider_height(&mut self, height: f32) {
        self.members.iter_mut().for_each(|m| m.set_slider_height(height));
    }

    fn present(&mut self) {
        let interactive = self
            .members
            .iter()
            .any(|m| m.config().environment == Environment::Interactive);
        if interactive {
            self.presented = Some(self.render(self.dpi()));
        }
    }
}
