use itertools::{Itertools, MinMaxResult};
use ndarray::{ArcArray, Array, ArrayBase, ArrayD, ArrayView2, ArrayViewD, Axis, Data, Dimension, Ix2, IxDyn};
use num::ToPrimitive;

use crate::error::{SliceError, SliceResult};
use crate::Idx3d;

pub mod slice;
pub mod window;

pub use slice::{ImgWriteVis, VolumeSlice};
pub use window::IntensityWindow;

/// 只读的 N 维标量体数据 (通常为 3 维 MRI/CT 扫描), 强度值以 `f32` 保存.
///
/// 底层数据以引用计数方式共享: 克隆 `Volume` 不会复制体素, 这也是浏览器深拷贝时
/// 体数据被只读共享的方式. 全局最小/最大值在构造时计算一次, 此后不再变化.
#[derive(Debug, Clone)]
pub struct Volume {
    data: ArcArray<f32, IxDyn>,
    window: IntensityWindow,
}

impl Volume {
    /// 由 `f32` 数组直接创建体数据. 非有限值 (NaN, inf) 不参与全局范围的计算.
    pub fn new<D: Dimension>(data: Array<f32, D>) -> Self {
        let data = data.into_dyn().into_shared();
        let window = match data.iter().copied().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => IntensityWindow::point(0.0),
            MinMaxResult::OneElement(v) => IntensityWindow::point(v),
            MinMaxResult::MinMax(lo, hi) => {
                IntensityWindow::from_range(lo, hi).unwrap_or(IntensityWindow::point(lo))
            }
        };
        Self { data, window }
    }

    /// 由任意数值类型的数组创建体数据.
    ///
    /// 存在无法转换为 `f32` 的元素时返回 [`SliceError::InvalidInput`].
    pub fn from_array<S, D, A>(array: &ArrayBase<S, D>) -> SliceResult<Self>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: ToPrimitive,
    {
        to_f32_array(array, true).map(Self::new)
    }

    /// 数据形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 数据维数.
    #[inline]
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// 体素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否不含任何体素?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 全体有限体素的最小值. 没有有限体素时为 0.
    #[inline]
    pub fn min(&self) -> f32 {
        self.window.lower_bound()
    }

    /// 全体有限体素的最大值. 没有有限体素时为 0.
    #[inline]
    pub fn max(&self) -> f32 {
        self.window.upper_bound()
    }

    /// 覆盖整个体数据强度范围的窗口.
    #[inline]
    pub fn window(&self) -> IntensityWindow {
        self.window
    }

    /// 检查轴是否合法, 返回该轴的长度.
    pub fn extent(&self, axis: usize) -> SliceResult<usize> {
        self.shape()
            .get(axis)
            .copied()
            .ok_or(SliceError::AxisOutOfBounds {
                axis,
                rank: self.rank(),
            })
    }

    /// 检查 `(index, axis)` 是否合法.
    #[inline]
    pub fn check(&self, index: usize, axis: usize) -> SliceResult<()> {
        check_bounds(self.shape(), index, axis).map(|_| ())
    }

    /// 获取沿 `axis` 第 `index` 层的 N-1 维视图. 适用于任意维数.
    pub fn slice_nd(&self, index: usize, axis: usize) -> SliceResult<ArrayViewD<'_, f32>> {
        check_bounds(self.shape(), index, axis)?;
        Ok(self.data.view().index_axis_move(Axis(axis), index))
    }

    /// 获取三维体数据沿 `axis` 第 `index` 层的二维切片.
    ///
    /// 维数不为 3 时返回 [`SliceError::UnsupportedRank`].
    pub fn slice_at(&self, index: usize, axis: usize) -> SliceResult<VolumeSlice<'_>> {
        slice_2d(self.data.view(), index, axis).map(|v| VolumeSlice::new(v, self.window))
    }

    /// 获取三维体数据给定位置的体素值. 越界或维数不为 3 时返回 `None`.
    pub fn get(&self, (a, b, c): Idx3d) -> Option<f32> {
        if self.rank() != 3 {
            return None;
        }
        self.data.get([a, b, c].as_slice()).copied()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// 深拷贝底层数据.
    #[inline]
    pub fn to_array(&self) -> ArrayD<f32> {
        self.data.to_owned()
    }

    /// 形状与强度范围的简要描述.
    pub fn info(&self) -> String {
        format!(
            "Shape: {:?}\nRange: [{}, {}]",
            self.shape(),
            self.min(),
            self.max()
        )
    }
}

/// 检查 `(index, axis)` 是否落在 `shape` 之内, 返回该轴的长度.
pub(crate) fn check_bounds(shape: &[usize], index: usize, axis: usize) -> SliceResult<usize> {
    let extent = *shape.get(axis).ok_or(SliceError::AxisOutOfBounds {
        axis,
        rank: shape.len(),
    })?;
    if index >= extent {
        return Err(SliceError::IndexOutOfBounds {
            index: index.try_into().unwrap_or(i64::MAX),
            axis,
            extent,
        });
    }
    Ok(extent)
}

/// 在固定 `axis` 的前提下选取第 `index` 层. 仅适用于三维数据.
pub(crate) fn slice_2d(
    data: ArrayViewD<'_, f32>,
    index: usize,
    axis: usize,
) -> SliceResult<ArrayView2<'_, f32>> {
    let rank = data.ndim();
    if rank != 3 {
        return Err(SliceError::UnsupportedRank(rank));
    }
    check_bounds(data.shape(), index, axis)?;
    data.index_axis_move(Axis(axis), index)
        .into_dimensionality::<Ix2>()
        .map_err(|_| SliceError::UnsupportedRank(rank))
}

/// 将任意数值数组转换为 `f32` 数组.
///
/// 无法转换的元素总是报错; `allow_non_finite` 为 `false` 时 NaN/inf 也报错.
pub(crate) fn to_f32_array<S, D, A>(array: &ArrayBase<S, D>, allow_non_finite: bool) -> SliceResult<ArrayD<f32>>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: ToPrimitive,
{
    let mut bad = None;
    let out = array.map(|v| match v.to_f32() {
        Some(f) if allow_non_finite || f.is_finite() => f,
        other => {
            bad.get_or_insert(other);
            0.0
        }
    });
    match bad {
        None => Ok(out.into_dyn()),
        Some(Some(f)) => Err(SliceError::InvalidInput(format!("数组中存在非有限值 `{f}`"))),
        Some(None) => Err(SliceError::InvalidInput(
            "数组中存在无法转换为 f32 的元素".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::Volume;
    use crate::error::SliceError;
    use ndarray::{Array, Array2, Array3, Axis};

    fn ramp(shape: (usize, usize, usize)) -> Array3<f32> {
        Array::from_iter((0..shape.0 * shape.1 * shape.2).map(|v| v as f32))
            .into_shape(shape)
            .unwrap()
    }

    #[test]
    fn test_slice_then_embed_reconstructs_layer() {
        let data = ramp((4, 5, 6));
        let volume = Volume::new(data.clone());
        for axis in 0..3 {
            for index in 0..data.shape()[axis] {
                let sli = volume.slice_at(index, axis).unwrap();
                let mut rebuilt = Array3::<f32>::zeros(data.dim());
                rebuilt.index_axis_mut(Axis(axis), index).assign(&sli.data());
                assert_eq!(
                    rebuilt.index_axis(Axis(axis), index),
                    data.index_axis(Axis(axis), index)
                );
            }
        }
    }

    #[test]
    fn test_axis_mapping() {
        let volume = Volume::new(ramp((2, 3, 4)));
        assert_eq!(volume.slice_at(0, 0).unwrap().shape(), (3, 4));
        assert_eq!(volume.slice_at(0, 1).unwrap().shape(), (2, 4));
        assert_eq!(volume.slice_at(0, 2).unwrap().shape(), (2, 3));

        // (1, 2, 3) = 1 * 12 + 2 * 4 + 3.
        assert_eq!(volume.slice_at(1, 0).unwrap()[(2, 3)], 23.0);
        assert_eq!(volume.slice_at(2, 1).unwrap()[(1, 3)], 23.0);
        assert_eq!(volume.slice_at(3, 2).unwrap()[(1, 2)], 23.0);
        assert_eq!(volume.get((1, 2, 3)), Some(23.0));
    }

    #[test]
    fn test_bounds() {
        let volume = Volume::new(ramp((2, 3, 4)));
        assert!(volume.slice_at(1, 0).is_ok());
        assert!(matches!(
            volume.slice_at(2, 0),
            Err(SliceError::IndexOutOfBounds { index: 2, axis: 0, extent: 2 })
        ));
        assert!(matches!(
            volume.slice_at(0, 3),
            Err(SliceError::AxisOutOfBounds { axis: 3, rank: 3 })
        ));
        assert_eq!(volume.extent(2), Ok(4));
    }

    #[test]
    fn test_non_3d_volume() {
        let volume = Volume::new(Array2::<f32>::zeros((3, 3)));
        assert_eq!(volume.slice_at(0, 0).unwrap_err(), SliceError::UnsupportedRank(2));
        assert_eq!(volume.slice_nd(1, 1).unwrap().shape(), &[3]);
        assert_eq!(volume.get((0, 0, 0)), None);
    }

    #[test]
    fn test_global_range_ignores_non_finite() {
        let mut data = ramp((2, 2, 2));
        data[(0, 0, 0)] = f32::NAN;
        data[(1, 1, 1)] = f32::INFINITY;
        let volume = Volume::new(data);
        assert_eq!(volume.min(), 1.0);
        assert_eq!(volume.max(), 6.0);
        assert!(volume.info().starts_with("Shape: [2, 2, 2]"));
    }

    #[test]
    fn test_from_integer_array() {
        let labels = Array3::<u8>::from_elem((2, 2, 2), 3);
        let volume = Volume::from_array(&labels).unwrap();
        assert_eq!(volume.min(), 3.0);
        assert_eq!(volume.max(), 3.0);
        assert_eq!(volume.window().width(), 0.0);
    }
}
