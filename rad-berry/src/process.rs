//! 逐元素的体数据预处理. 所有函数都返回新的 [`Volume`], 不修改输入.

use ndarray::{ArrayD, Axis, IxDyn, Slice, Zip};
use ordered_float::NotNan;

use crate::consts::gray::is_mask_background;
use crate::error::{SliceError, SliceResult};
use crate::overlay::MaskInput;
use crate::Volume;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::slice::ParallelSliceMut;
    }
}

/// 高斯核截断半径 (以标准差为单位).
const GAUSSIAN_TRUNCATE: f64 = 4.0;

fn map_volume<F>(volume: &Volume, f: F) -> Volume
where
    F: Fn(f32) -> f32 + Sync + Send,
{
    let mut data = volume.to_array();
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            data.par_mapv_inplace(f);
        } else {
            data.mapv_inplace(f);
        }
    }
    Volume::new(data)
}

/// 以 `(v - min) / (max - min)` 线性映射全部体素.
///
/// `min`, `max` 非有限或相等时返回 [`SliceError::InvalidInput`].
pub fn normalization(volume: &Volume, min: f32, max: f32) -> SliceResult<Volume> {
    if !min.is_finite() || !max.is_finite() || min == max {
        return Err(SliceError::InvalidInput(format!(
            "归一化区间 [{min}, {max}] 无意义"
        )));
    }
    let scale = max - min;
    Ok(map_volume(volume, |v| (v - min) / scale))
}

/// 以体数据自身的 `[min, max]` 归一化到 `[0, 1]`.
#[inline]
pub fn intensity_normalization(volume: &Volume) -> SliceResult<Volume> {
    normalization(volume, volume.min(), volume.max())
}

/// 求有限体素的第 `p` 百分位数 (线性插值). 没有有限体素时返回 `None`.
fn percentiles(volume: &Volume, ps: [f64; 2]) -> Option<[f32; 2]> {
    let mut values: Vec<NotNan<f32>> = volume
        .data()
        .iter()
        .filter(|v| v.is_finite())
        .filter_map(|&v| NotNan::new(v).ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            values.par_sort_unstable();
        } else {
            values.sort_unstable();
        }
    }
    let last = values.len() - 1;
    Some(ps.map(|p| {
        let rank = p / 100.0 * last as f64;
        let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
        let (a, b) = (values[lo].into_inner() as f64, values[hi].into_inner() as f64);
        (a + (b - a) * (rank - lo as f64)) as f32
    }))
}

/// 将体素截断到 `[lower, upper]` 百分位数之间.
///
/// 需要 `0 <= lower <= upper <= 100`; 体数据不含有限值时同样返回 [`SliceError::InvalidInput`].
pub fn percentile_clipping(volume: &Volume, lower: f64, upper: f64) -> SliceResult<Volume> {
    if !(0.0..=100.0).contains(&lower) || !(0.0..=100.0).contains(&upper) || lower > upper {
        return Err(SliceError::InvalidInput(format!(
            "百分位区间 [{lower}, {upper}] 不合法"
        )));
    }
    let [lo, hi] = percentiles(volume, [lower, upper])
        .ok_or_else(|| SliceError::InvalidInput("体数据不含有限值".to_string()))?;
    Ok(map_volume(volume, |v| v.clamp(lo, hi)))
}

/// 在每个轴两侧补 0, 使形状变为 `expected`. 多出的一个体素补在末尾.
///
/// 维数不同, 或某个轴已经大于期望长度时返回 [`SliceError::InvalidInput`].
pub fn add_padding(volume: &Volume, expected: &[usize]) -> SliceResult<Volume> {
    let shape = volume.shape();
    if expected.len() != shape.len() || expected.iter().zip(shape).any(|(e, s)| e < s) {
        return Err(SliceError::InvalidInput(format!(
            "无法将形状 {shape:?} 补齐为 {expected:?}"
        )));
    }
    let before: Vec<usize> = expected.iter().zip(shape).map(|(e, s)| (e - s) / 2).collect();
    let mut out = ArrayD::<f32>::zeros(IxDyn(expected));
    out.slice_each_axis_mut(|ax| {
        let i = ax.axis.index();
        Slice::from(before[i]..before[i] + shape[i])
    })
    .assign(&volume.data());
    Ok(Volume::new(out))
}

/// 反射边界下标 (`d c b a | a b c d | d c b a`).
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m - 1 }) as usize
}

/// 截断于 4σ 的归一化一维高斯核, 半径不超过 `max_radius`.
fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    let radius = ((GAUSSIAN_TRUNCATE * sigma + 0.5) as usize).min(max_radius) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// 可分离高斯滤波降噪, 边界采用反射模式.
///
/// `sigma` 非有限或为负时返回 [`SliceError::InvalidInput`]; `sigma == 0` 时原样复制.
pub fn noise_reduction(volume: &Volume, sigma: f64) -> SliceResult<Volume> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SliceError::InvalidInput(format!("高斯标准差 {sigma} 不合法")));
    }
    let mut data = volume.to_array();
    if sigma == 0.0 {
        return Ok(Volume::new(data));
    }
    for axis in 0..data.ndim() {
        // 反射边界下, 超出轴长的半径只会重复折叠同一批体素.
        let kernel = gaussian_kernel(sigma, data.len_of(Axis(axis)));
        let radius = (kernel.len() / 2) as isize;
        let convolve = |mut lane: ndarray::ArrayViewMut1<f32>| {
            let src: Vec<f32> = lane.to_vec();
            let n = src.len();
            for (i, out) in lane.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * src[reflect(i as isize + k as isize - radius, n)] as f64)
                    .sum::<f64>() as f32;
            }
        };
        let lanes = Zip::from(data.lanes_mut(Axis(axis)));
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                lanes.par_for_each(convolve);
            } else {
                lanes.for_each(convolve);
            }
        }
        log::debug!("高斯降噪: sigma = {sigma}, 轴 {axis} 核长度 {}", kernel.len());
    }
    Ok(Volume::new(data))
}

/// 只保留掩膜非零处的体素, 其余置 0. `invert` 为 `true` 时反之.
///
/// 掩膜形状不符时返回 [`SliceError::ShapeMismatch`].
pub fn apply_mask<M: MaskInput>(volume: &Volume, mask: M, invert: bool) -> SliceResult<Volume> {
    let mask = mask.into_mask_data()?;
    if mask.shape() != volume.shape() {
        return Err(SliceError::ShapeMismatch {
            expected: volume.shape().to_vec(),
            found: mask.shape().to_vec(),
        });
    }
    let mut data = volume.to_array();
    Zip::from(&mut data).and(&mask).for_each(|v, &m| {
        if is_mask_background(m) != invert {
            *v = 0.0;
        }
    });
    Ok(Volume::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array3};

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn ramp(shape: (usize, usize, usize)) -> Volume {
        let n = shape.0 * shape.1 * shape.2;
        Volume::new(
            Array::from_iter((0..n).map(|v| v as f32))
                .into_shape(shape)
                .unwrap(),
        )
    }

    #[test]
    fn test_normalization() {
        let volume = ramp((2, 2, 2));
        let out = normalization(&volume, 2.0, 6.0).unwrap();
        assert_eq!(out.get((0, 0, 0)), Some(-0.5));
        assert_eq!(out.get((1, 1, 0)), Some(1.0));
        assert!(normalization(&volume, 1.0, 1.0).is_err());

        let unit = intensity_normalization(&volume).unwrap();
        assert_eq!((unit.min(), unit.max()), (0.0, 1.0));
        let flat = Volume::new(Array3::<f32>::ones((2, 2, 2)));
        assert!(intensity_normalization(&flat).is_err());
    }

    #[test]
    fn test_percentile_clipping() {
        // 0..=9: 25% -> 2.25, 75% -> 6.75.
        let volume = Volume::new(Array::from_iter((0..10).map(|v| v as f32)).into_shape((1, 2, 5)).unwrap());
        let out = percentile_clipping(&volume, 25.0, 75.0).unwrap();
        assert!(float_eq(out.min(), 2.25));
        assert!(float_eq(out.max(), 6.75));
        assert_eq!(out.get((0, 0, 4)), Some(4.0));

        let same = percentile_clipping(&volume, 0.0, 100.0).unwrap();
        assert_eq!(same.data(), volume.data());
        assert!(percentile_clipping(&volume, 80.0, 20.0).is_err());
        assert!(percentile_clipping(&volume, -1.0, 20.0).is_err());
    }

    #[test]
    fn test_add_padding() {
        let volume = ramp((2, 2, 2));
        let out = add_padding(&volume, &[4, 5, 2]).unwrap();
        assert_eq!(out.shape(), &[4, 5, 2]);
        // 前侧 (1, 1, 0), 后侧 (1, 2, 0).
        assert_eq!(out.get((1, 1, 0)), Some(0.0));
        assert_eq!(out.get((1, 1, 1)), Some(1.0));
        assert_eq!(out.get((2, 2, 1)), Some(7.0));
        assert_eq!(out.get((3, 4, 1)), Some(0.0));
        assert_eq!(out.get((0, 0, 0)), Some(0.0));
        assert!(add_padding(&volume, &[1, 2, 2]).is_err());
        assert!(add_padding(&volume, &[2, 2]).is_err());
    }

    #[test]
    fn test_reflect() {
        let idx: Vec<usize> = (-3..7).map(|i| reflect(i, 4)).collect();
        assert_eq!(idx, vec![2, 1, 0, 0, 1, 2, 3, 3, 2, 1]);
        assert_eq!(reflect(-5, 1), 0);
    }

    #[test]
    fn test_noise_reduction() {
        let constant = Volume::new(Array3::<f32>::from_elem((4, 5, 6), 3.0));
        let out = noise_reduction(&constant, 1.5).unwrap();
        assert!(out.data().iter().all(|&v| float_eq(v, 3.0)));

        let mut impulse = Array3::<f32>::zeros((9, 9, 9));
        impulse[(4, 4, 4)] = 1.0;
        let out = noise_reduction(&Volume::new(impulse.clone()), 1.0).unwrap();
        let total: f32 = out.data().iter().sum();
        assert!(float_eq(total, 1.0));
        assert!(out.get((4, 4, 4)).unwrap() < 1.0);
        assert!(out.get((4, 4, 5)).unwrap() > 0.0);

        let same = noise_reduction(&Volume::new(impulse.clone()), 0.0).unwrap();
        assert_eq!(same.data(), impulse.into_dyn().view());
        assert!(noise_reduction(&constant, -1.0).is_err());
    }

    #[test]
    fn test_kernel_radius_bounded_by_axis() {
        assert_eq!(gaussian_kernel(1.0, 100).len(), 9);
        assert_eq!(gaussian_kernel(1e12, 5).len(), 11);
        assert_eq!(gaussian_kernel(f64::MAX, 3).len(), 7);
        assert!(float_eq(gaussian_kernel(1e12, 5).iter().sum::<f64>() as f32, 1.0));
    }

    #[test]
    fn test_noise_reduction_huge_sigma() {
        let constant = Volume::new(Array3::<f32>::from_elem((3, 4, 5), 2.0));
        let out = noise_reduction(&constant, 1e15).unwrap();
        assert!(out.data().iter().all(|&v| float_eq(v, 2.0)));

        let mut impulse = Array3::<f32>::zeros((3, 4, 5));
        impulse[(1, 2, 2)] = 60.0;
        let out = noise_reduction(&Volume::new(impulse), 1e15).unwrap();
        assert!(out.data().iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn test_apply_mask() {
        let volume = ramp((2, 2, 2));
        let mut mask = Array3::<u8>::zeros((2, 2, 2));
        mask[(1, 1, 1)] = 1;
        let kept = apply_mask(&volume, &mask, false).unwrap();
        assert_eq!(kept.data().iter().copied().sum::<f32>(), 7.0);
        let inverted = apply_mask(&volume, &mask, true).unwrap();
        assert_eq!(inverted.get((1, 1, 1)), Some(0.0));
        assert_eq!(inverted.get((0, 0, 1)), Some(1.0));
        assert!(matches!(
            apply_mask(&volume, Array3::<u8>::zeros((2, 2, 3)), false),
            Err(SliceError::ShapeMismatch { .. })
        ));
    }
}
