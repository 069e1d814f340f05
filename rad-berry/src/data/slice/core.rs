use crate::{Idx2d, IntensityWindow};
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, Ix2};
use std::ops::Index;

/// 不可变、借用的二维体数据切片.
///
/// 切片同时携带其所属体数据的强度窗口, 因此单独保存或显示时与浏览器中的对比度一致.
#[derive(Clone, Debug)]
pub struct VolumeSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::Volume`] 或掩膜.
    data: ArrayView2<'a, f32>,

    /// 所属体数据的全局强度窗口.
    window: IntensityWindow,
}

impl Index<Idx2d> for VolumeSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> VolumeSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>, window: IntensityWindow) -> Self {
        Self { data, window }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 所属体数据的强度窗口.
    #[inline]
    pub fn window(&self) -> IntensityWindow {
        self.window
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 获得图像的高.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 获得图像的宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 克隆自己, 获得拥有所有权的数据.
    pub fn to_owned(&self) -> Array2<f32> {
        self.data.to_owned()
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f32)> {
        self.data.indexed_iter()
    }
}
