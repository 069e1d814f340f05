//! 单个切片浏览器与浏览器组.
//!
//! 浏览器状态机: 未初始化 -> 已显示 (首次 [`Viewer::display`]), 之后任何翻页,
//! 掩膜增删或布局修改都在已显示的状态上原地进行.

use image::RgbaImage;
use std::path::Path;
use std::time::Duration;

use crate::consts::{layout, DEFAULT_MASK_OPACITY};
use crate::error::{SliceError, SliceResult};
use crate::overlay::{ColorSpec, Colormap, MaskInput, MaskOverlay, MaskRegistry};
use crate::render::{Canvas, FigureSize, Panel, Rect, RenderHandle};
use crate::Volume;

pub mod controller;
mod export;
pub mod group;
#[cfg(feature = "plot")]
pub mod plot;

pub use controller::{Control, Environment, PositionController, Slider};
pub use export::ExportReport;
pub use group::ViewerGroup;

/// 浏览器配置.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewerConfig {
    /// 标题. 为 `None` 时使用 `"Axis: {axis}"`.
    pub title: Option<String>,
    /// 底图色图.
    pub colormap: Colormap,
    /// 画布尺寸 (英寸).
    pub figure_size: FigureSize,
    /// 每英寸像素数.
    pub dpi: f32,
    /// 是否显示滑块 (仅交互环境有效).
    pub show_slider: bool,
    /// 是否绘制图像边框.
    pub show_axis: bool,
    /// 滑块相对图像区域的下移量.
    pub slider_gap: f32,
    /// 滑块高度.
    pub slider_height: f32,
    /// 显式滑块位置. 为 `None` 时自动推算.
    pub slider_geometry: Option<Rect>,
    /// 运行环境.
    pub environment: Environment,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: None,
            colormap: Colormap::default(),
            figure_size: FigureSize::default(),
            dpi: layout::DEFAULT_DPI,
            show_slider: true,
            show_axis: true,
            slider_gap: layout::SLIDER_GAP,
            slider_height: layout::SLIDER_HEIGHT,
            slider_geometry: None,
            environment: Environment::default(),
        }
    }
}

impl ViewerConfig {
    /// 设置标题.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// 设置底图色图.
    pub fn with_colormap(mut self, colormap: impl Into<Colormap>) -> Self {
        self.colormap = colormap.into();
        self
    }

    /// 设置画布尺寸 (英寸).
    pub fn with_figure_size(mut self, width: f32, height: f32) -> Self {
        self.figure_size = FigureSize::new(width, height);
        self
    }

    /// 设置 dpi.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// 是否显示滑块.
    pub fn with_show_slider(mut self, show: bool) -> Self {
        self.show_slider = show;
        self
    }

    /// 是否绘制图像边框.
    pub fn with_show_axis(mut self, show: bool) -> Self {
        self.show_axis = show;
        self
    }

    /// 设置滑块下移量.
    pub fn with_slider_gap(mut self, gap: f32) -> Self {
        self.slider_gap = gap;
        self
    }

    /// 设置滑块高度.
    pub fn with_slider_height(mut self, height: f32) -> Self {
        self.slider_height = height;
        self
    }

    /// 设置显式滑块位置.
    pub fn with_slider_geometry(mut self, rect: Rect) -> Self {
        self.slider_geometry = Some(rect);
        self
    }

    /// 设置运行环境.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.environment = env;
        self
    }
}

/// 单个切片浏览器. 绑定一个体数据和一个固定的轴.
///
/// 克隆 (或 [`Viewer::copy`]) 得到的浏览器与原浏览器完全独立:
/// 体数据只读共享, 掩膜注册表, 位置状态与渲染句柄都被深拷贝.
#[derive(Clone, Debug)]
pub struct Viewer {
    volume: Volume,
    axis: usize,
    config: ViewerConfig,
    masks: MaskRegistry,
    controller: PositionController,
    panel: Option<Panel>,
    handle: Option<RenderHandle>,
    presented: Option<RgbaImage>,
}

impl Viewer {
    /// 以默认配置创建浏览器. `axis` 越界时返回 [`SliceError::AxisOutOfBounds`].
    #[inline]
    pub fn new(volume: Volume, axis: usize) -> SliceResult<Self> {
        Self::with_config(volume, axis, ViewerConfig::default())
    }

    /// 以给定配置创建浏览器.
    pub fn with_config(volume: Volume, axis: usize, config: ViewerConfig) -> SliceResult<Self> {
        let extent = volume.extent(axis)?;
        let mut controller = PositionController::new(config.environment, axis, extent);
        controller.set_gap(config.slider_gap);
        controller.set_height(config.slider_height);
        controller.set_geometry(config.slider_geometry);
        let masks = MaskRegistry::new(volume.shape());
        Ok(Self {
            volume,
            axis,
            config,
            masks,
            controller,
            panel: None,
            handle: None,
            presented: None,
        })
    }

    /// 深拷贝.
    #[inline]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// 标题.
    pub fn title(&self) -> String {
        match &self.config.title {
            Some(t) => t.clone(),
            None => format!("Axis: {}", self.axis),
        }
    }

    /// 切片所在轴.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// 当前切片位置.
    #[inline]
    pub fn index(&self) -> usize {
        self.controller.index()
    }

    /// 当前轴的长度.
    #[inline]
    pub fn extent(&self) -> usize {
        self.controller.extent()
    }

    /// 体数据.
    #[inline]
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// 配置.
    #[inline]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// 掩膜注册表.
    #[inline]
    pub fn masks(&self) -> &MaskRegistry {
        &self.masks
    }

    /// 位置控制器.
    #[inline]
    pub fn controller(&self) -> &PositionController {
        &self.controller
    }

    /// 渲染句柄. 未显示时为 `None`.
    #[inline]
    pub fn handle(&self) -> Option<&RenderHandle> {
        self.handle.as_ref()
    }

    /// 绘制目标. 未显示时为 `None`.
    #[inline]
    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    /// 是否已经显示过?
    #[inline]
    pub fn is_displayed(&self) -> bool {
        self.handle.is_some()
    }

    /// 交互环境下最近一次呈现给宿主的画面.
    #[inline]
    pub fn presented(&self) -> Option<&RgbaImage> {
        self.presented.as_ref()
    }

    /// 显示浏览器.
    ///
    /// 未给出 `panel` 时使用按 `figure_size` 创建的独立画布. 首先初始化位置控制器,
    /// 然后完成首次渲染. `show` 为 `true` 时立即呈现: 交互环境下把画面交给宿主,
    /// 批处理环境下什么也不做.
    ///
    /// 体数据维数不为 3 时返回 [`SliceError::UnsupportedRank`]; 失败时状态不变.
    pub fn display(&mut self, panel: Option<Panel>, initial_index: usize, show: bool) -> SliceResult<()> {
        let rank = self.volume.rank();
        if rank != 3 {
            return Err(SliceError::UnsupportedRank(rank));
        }
        self.controller.check(initial_index.try_into().unwrap_or(i64::MAX))?;
        let handle = RenderHandle::create(
            &self.volume,
            &self.masks,
            &self.config.colormap,
            self.axis,
            initial_index,
        )?;

        let panel = panel.unwrap_or_else(|| Panel::single(self.config.figure_size));
        self.controller.set(initial_index)?;
        let title = self.title();
        self.controller.attach(panel.rect, title.as_str(), self.config.show_slider);
        self.panel = Some(panel);
        self.handle = Some(handle);
        log::info!("显示 `{title}`: {} 个掩膜, index = {initial_index}", self.masks.len());

        if show {
            self.present();
        }
        Ok(())
    }

    /// 呈现当前画面. 批处理环境下为空操作.
    pub fn present(&mut self) {
        match self.config.environment {
            Environment::Interactive => self.presented = self.compose(self.config.dpi),
            Environment::Batch => log::debug!("批处理环境, 跳过呈现"),
        }
    }

    /// 切换到第 `index` 层并同步重绘. 越界时返回 [`SliceError::IndexOutOfBounds`], 状态不变.
    pub fn set_index(&mut self, index: usize) -> SliceResult<()> {
        self.controller.check(index.try_into().unwrap_or(i64::MAX))?;
        if let Some(handle) = &mut self.handle {
            handle.update(&self.volume, &self.masks, index)?;
        }
        self.controller.set(index)?;
        self.refresh();
        Ok(())
    }

    /// 显示宿主的滑块回调. 取值四舍五入后按索引处理, 负数与越界值被拒绝.
    pub fn slider_input(&mut self, value: f64) -> SliceResult<()> {
        if !value.is_finite() {
            return Err(SliceError::InvalidInput(format!("滑块取值 `{value}` 无意义")));
        }
        // `as` 对超出 i64 范围的值饱和.
        let index = self.controller.check(value.round() as i64)?;
        self.set_index(index)
    }

    /// 注册掩膜. 已显示时立即追加对应的掩膜层并重绘.
    ///
    /// 形状不符时返回 [`SliceError::ShapeMismatch`]; 颜色规格非法时返回
    /// [`SliceError::InvalidColorSpec`]; 不透明度或掩膜数值非法时返回
    /// [`SliceError::InvalidInput`]. 失败时状态不变.
    pub fn add_mask<M: MaskInput>(
        &mut self,
        mask: M,
        color: impl Into<ColorSpec>,
        opacity: f32,
    ) -> SliceResult<()> {
        let overlay = self.masks.register(mask, color, opacity)?;
        if let Some(handle) = &mut self.handle {
            if let Err(e) = handle.attach_mask(overlay) {
                self.masks.remove(self.masks.len() - 1);
                return Err(e);
            }
        }
        self.refresh();
        Ok(())
    }

    /// 以默认颜色 ([`crate::consts::DEFAULT_MASK_COLOR`]) 与默认不透明度
    /// ([`crate::consts::DEFAULT_MASK_OPACITY`]) 注册掩膜. 其余同 [`Viewer::add_mask`].
    #[inline]
    pub fn add_mask_default<M: MaskInput>(&mut self, mask: M) -> SliceResult<()> {
        self.add_mask(mask, ColorSpec::default(), DEFAULT_MASK_OPACITY)
    }

    /// 移除第 `pos` 个掩膜并重绘.
    pub fn remove_mask(&mut self, pos: usize) -> Option<MaskOverlay> {
        let removed = self.masks.remove(pos)?;
        if let Some(handle) = &mut self.handle {
            handle.detach_mask(pos);
        }
        self.refresh();
        Some(removed)
    }

    /// 移除全部掩膜并重绘.
    pub fn clear_masks(&mut self) {
        self.masks.clear();
        if let Some(handle) = &mut self.handle {
            handle.detach_all();
        }
        self.refresh();
    }

    /// 修改滑块下移量. 滑块已存在时按新位置重建.
    pub fn set_slider_gap(&mut self, gap: f32) {
        self.config.slider_gap = gap;
        self.controller.set_gap(gap);
        self.refresh();
    }

    /// 修改滑块高度. 滑块已存在时按新位置重建.
    pub fn set_slider_height(&mut self, height: f32) {
        self.config.slider_height = height;
        self.controller.set_height(height);
        self.refresh();
    }

    /// 指定 (或以 `None` 取消) 显式滑块位置.
    pub fn set_slider_geometry(&mut self, rect: Option<Rect>) {
        self.config.slider_geometry = rect;
        self.controller.set_geometry(rect);
        self.refresh();
    }

    /// 显示或移除滑块. 移除后浏览器仍可通过 [`Viewer::set_index`] 翻页.
    pub fn set_show_slider(&mut self, show: bool) {
        self.config.show_slider = show;
        if show {
            self.controller.restore_control();
        } else {
            self.controller.remove_control();
        }
        self.refresh();
    }

    /// 是否绘制图像边框.
    pub fn set_show_axis(&mut self, show: bool) {
        self.config.show_axis = show;
        self.refresh();
    }

    /// 当前切片的合成图像 (切片分辨率). 未显示时先以批处理方式初始化.
    pub fn snapshot(&mut self) -> SliceResult<RgbaImage> {
        self.ensure_displayed()?;
        self.handle
            .as_ref()
            .map(RenderHandle::composite)
            .ok_or(SliceError::UnsupportedRank(self.volume.rank()))
    }

    /// 以给定 dpi 渲染整幅画布. 未显示时先以批处理方式初始化.
    pub fn render_figure(&mut self, dpi: f32) -> SliceResult<RgbaImage> {
        self.ensure_displayed()?;
        self.compose(dpi)
            .ok_or(SliceError::UnsupportedRank(self.volume.rank()))
    }

    /// 将当前画面绘制到 `canvas` 上浏览器所在的区域. 未显示时什么也不画.
    pub fn draw_into(&self, canvas: &mut Canvas) {
        let (Some(handle), Some(panel)) = (&self.handle, &self.panel) else {
            return;
        };
        canvas.draw_image(&panel.rect, &handle.composite(), self.config.show_axis);
        if let Some(slider) = self.controller.slider() {
            canvas.draw_slider(&slider.rect(), slider.fraction());
        }
    }

    /// 切换到第 `index` 层, 并以给定 dpi 渲染整幅画布.
    pub fn frame_at(&mut self, index: usize, dpi: f32) -> SliceResult<RgbaImage> {
        self.ensure_displayed()?;
        self.set_index(index)?;
        self.render_figure(dpi)
    }

    /// 依次渲染 `0..extent` 的每一层. 结束后浏览器停在最后一层.
    pub fn frames(&mut self) -> SliceResult<Vec<RgbaImage>> {
        self.ensure_displayed()?;
        let dpi = self.config.dpi;
        (0..self.extent()).map(|i| self.frame_at(i, dpi)).collect()
    }

    /// 将全部切片按 `fps` 导出为 gif 动画.
    ///
    /// `fps` 非正, 非有限或小到帧间隔无法表示时返回 [`SliceError::InvalidInput`]. 编码错误 (如路径不可写)
    /// 不会返回 `Err`, 而是记录日志并放入 [`ExportReport::error`], 浏览器仍可继续使用.
    pub fn save_animation(&mut self, path: impl AsRef<Path>, fps: f32) -> SliceResult<ExportReport> {
        let interval = export::frame_interval(fps)
            .ok_or_else(|| SliceError::InvalidInput(format!("帧率 `{fps}` 必须为正数且不能过小")))?;
        let path = path.as_ref();
        let frames = self.frames()?;
        let count = frames.len();
        log::info!("导出 {count} 帧到 {path:?}, 帧间隔 {interval:?}");

        let error = export::encode_animation(path, frames, interval).err();
        if let Some(e) = &error {
            log::error!("导出动画 {path:?} 失败: {e}");
        }
        Ok(ExportReport {
            path: path.to_path_buf(),
            frames: count,
            interval,
            error,
        })
    }

    /// 切换到第 `index` 层, 并以给定 dpi 写出静态图像. 编码错误的处理同
    /// [`Viewer::save_animation`].
    pub fn save_frame(&mut self, path: impl AsRef<Path>, index: usize, dpi: f32) -> SliceResult<ExportReport> {
        let path = path.as_ref();
        let frame = self.frame_at(index, dpi)?;
        let error = export::encode_still(path, &frame).err();
        match &error {
            Some(e) => log::error!("保存第 {index} 帧到 {path:?} 失败: {e}"),
            None => log::info!("保存第 {index} 帧到 {path:?}"),
        }
        Ok(ExportReport {
            path: path.to_path_buf(),
            frames: 1,
            interval: Duration::ZERO,
            error,
        })
    }

    fn ensure_displayed(&mut self) -> SliceResult<()> {
        if self.handle.is_none() {
            self.display(None, self.controller.index(), false)?;
        }
        Ok(())
    }

    fn compose(&self, dpi: f32) -> Option<RgbaImage> {
        let panel = self.panel.as_ref()?;
        let mut canvas = Canvas::new(panel.figure, dpi);
        self.draw_into(&mut canvas);
        Some(canvas.into_image())
    }

    /// 已经呈现给宿主时, 同步更新呈现的画面.
    fn refresh(&mut self) {
        if self.presented.is_some() {
            self.presented = self.compose(self.config.dpi);
        }
    }
}
