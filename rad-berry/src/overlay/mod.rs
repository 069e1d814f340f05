//! 掩膜叠加层注册表.
//!
//! 掩膜在注册时即完成全部校验 (形状, 数值, 不透明度, 颜色规格), 渲染阶段不再报错.

use ndarray::{ArrayBase, ArrayD, ArrayView2, Data, Dimension};
use num::ToPrimitive;

use crate::consts::{DEFAULT_MASK_COLOR, DEFAULT_MASK_OPACITY};
use crate::data::{slice_2d, to_f32_array};
use crate::error::{SliceError, SliceResult};
use crate::{IntensityWindow, Volume};

mod color;
mod colormap;

pub use color::Rgba;
pub use colormap::{Colormap, NamedColormap};

/// 掩膜的颜色规格.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorSpec {
    /// 名称. 优先按色图名解析, 否则按颜色名或十六进制颜色解析.
    Name(String),

    /// 单一纯色.
    Color(Rgba),

    /// 显式色图, 原样使用.
    Colormap(Colormap),
}

impl ColorSpec {
    /// 解析为色图. 既不是已知色图也不是合法颜色时返回 [`SliceError::InvalidColorSpec`].
    pub fn resolve(&self) -> SliceResult<Colormap> {
        match self {
            Self::Name(name) => Colormap::from_name(name)
                .or_else(|| Rgba::parse(name).map(Colormap::flat))
                .ok_or_else(|| SliceError::InvalidColorSpec(name.clone())),
            Self::Color(c) => Ok(Colormap::flat(*c)),
            Self::Colormap(cmap) => Ok(cmap.clone()),
        }
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::Name(DEFAULT_MASK_COLOR.to_string())
    }
}

impl From<&str> for ColorSpec {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for ColorSpec {
    #[inline]
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<Rgba> for ColorSpec {
    #[inline]
    fn from(value: Rgba) -> Self {
        Self::Color(value)
    }
}

impl From<Colormap> for ColorSpec {
    #[inline]
    fn from(value: Colormap) -> Self {
        Self::Colormap(value)
    }
}

impl From<NamedColormap> for ColorSpec {
    #[inline]
    fn from(value: NamedColormap) -> Self {
        Self::Colormap(Colormap::Named(value))
    }
}

/// 可作为掩膜注册的输入: 裸数组, 或包装了数组的体数据对象.
pub trait MaskInput {
    /// 转换为 `f32` 掩膜数据. 含非有限值或无法转换的元素时返回 [`SliceError::InvalidInput`].
    fn into_mask_data(self) -> SliceResult<ArrayD<f32>>;
}

impl<S, D, A> MaskInput for ArrayBase<S, D>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: ToPrimitive,
{
    fn into_mask_data(self) -> SliceResult<ArrayD<f32>> {
        to_f32_array(&self, false)
    }
}

impl<S, D, A> MaskInput for &ArrayBase<S, D>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: ToPrimitive,
{
    fn into_mask_data(self) -> SliceResult<ArrayD<f32>> {
        to_f32_array(self, false)
    }
}

impl MaskInput for &Volume {
    fn into_mask_data(self) -> SliceResult<ArrayD<f32>> {
        to_f32_array(&self.data(), false)
    }
}

impl MaskInput for Volume {
    fn into_mask_data(self) -> SliceResult<ArrayD<f32>> {
        (&self).into_mask_data()
    }
}

/// 一个已注册的掩膜叠加层.
#[derive(Clone, Debug)]
pub struct MaskOverlay {
    data: ArrayD<f32>,
    colormap: Colormap,
    opacity: f32,
    window: IntensityWindow,
}

impl MaskOverlay {
    fn new(data: ArrayD<f32>, colormap: Colormap, opacity: f32) -> Self {
        let vmax = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        // 全零 (或全负) 掩膜不会绘制任何内容, 窗口取 [0, 1] 即可.
        let vmax = if vmax > 0.0 { vmax } else { 1.0 };
        let window = IntensityWindow::from_range(0.0, vmax).unwrap_or(IntensityWindow::point(0.0));
        Self {
            data,
            colormap,
            opacity,
            window,
        }
    }

    /// 掩膜数据.
    #[inline]
    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// 解析后的色图.
    #[inline]
    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    /// 不透明度, 位于 `[0, 1]`.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// 固定的 `[0, max(mask)]` 强度窗口.
    #[inline]
    pub fn window(&self) -> IntensityWindow {
        self.window
    }

    /// 沿 `axis` 第 `index` 层的掩膜切片.
    #[inline]
    pub fn slice_at(&self, index: usize, axis: usize) -> SliceResult<ArrayView2<'_, f32>> {
        slice_2d(self.data.view(), index, axis)
    }
}

/// 按插入顺序保存的掩膜叠加层. 渲染顺序即插入顺序, 后注册者覆盖先注册者.
#[derive(Clone, Debug)]
pub struct MaskRegistry {
    shape: Vec<usize>,
    overlays: Vec<MaskOverlay>,
}

impl MaskRegistry {
    /// 创建与给定体数据形状绑定的空注册表.
    pub fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            overlays: Vec::new(),
        }
    }

    /// 注册掩膜. 失败时注册表保持不变.
    ///
    /// 依次检查不透明度, 掩膜数值, 形状与颜色规格.
    pub fn register<M: MaskInput>(
        &mut self,
        mask: M,
        color: impl Into<ColorSpec>,
        opacity: f32,
    ) -> SliceResult<&MaskOverlay> {
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(SliceError::InvalidInput(format!(
                "不透明度 {opacity} 不在 [0, 1] 内"
            )));
        }
        let data = mask.into_mask_data()?;
        if data.shape() != self.shape.as_slice() {
            return Err(SliceError::ShapeMismatch {
                expected: self.shape.clone(),
                found: data.shape().to_vec(),
            });
        }
        let colormap = color.into().resolve()?;
        log::debug!("注册掩膜 #{}: {:?}, opacity = {}", self.overlays.len(), colormap, opacity);

        self.overlays.push(MaskOverlay::new(data, colormap, opacity));
        Ok(&self.overlays[self.overlays.len() - 1])
    }

    /// 以默认颜色与不透明度注册掩膜.
    #[inline]
    pub fn register_default<M: MaskInput>(&mut self, mask: M) -> SliceResult<&MaskOverlay> {
        self.register(mask, ColorSpec::default(), DEFAULT_MASK_OPACITY)
    }

    /// 移除第 `pos` 个掩膜. 越界时返回 `None`.
    pub fn remove(&mut self, pos: usize) -> Option<MaskOverlay> {
        (pos < self.overlays.len()).then(|| self.overlays.remove(pos))
    }

    /// 移除全部掩膜.
    #[inline]
    pub fn clear(&mut self) {
        self.overlays.clear();
    }

    /// 已注册的掩膜, 按渲染顺序.
    #[inline]
    pub fn overlays(&self) -> &[MaskOverlay] {
        &self.overlays
    }

    /// 掩膜个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// 是否没有任何掩膜?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// 绑定的体数据形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}
