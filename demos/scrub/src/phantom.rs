//! 合成体模.

use ndarray::{s, Array3};

/// 球形体模: 中心亮, 向外线性衰减, 球外为 0.
pub fn sphere(n: usize) -> Array3<f32> {
    let c = (n as f32 - 1.0) / 2.0;
    let r = n as f32 / 2.0;
    Array3::from_shape_fn((n, n, n), |(z, y, x)| {
        let d = ((z as f32 - c).powi(2) + (y as f32 - c).powi(2) + (x as f32 - c).powi(2)).sqrt();
        (1.0 - d / r).max(0.0) * 1000.0
    })
}

/// 位于中心的立方体掩膜, 边长为 `n / 2`.
pub fn cube_mask(n: usize) -> Array3<f32> {
    let mut mask = Array3::<f32>::zeros((n, n, n));
    let (lo, hi) = (n / 4, n - n / 4);
    mask.slice_mut(s![lo..hi, lo..hi, lo..hi]).fill(1.0);
    mask
}

/// 位于一角的小立方体, 标签值为 2.
pub fn corner_mask(n: usize) -> Array3<f32> {
    let mut mask = Array3::<f32>::zeros((n, n, n));
    let k = (n / 5).max(1);
    mask.slice_mut(s![..k, ..k, ..k]).fill(2.0);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phantom() {
        let v = sphere(9);
        assert_eq!(v[[4, 4, 4]], 1000.0);
        assert_eq!(v[[0, 0, 0]], 0.0);
        assert_eq!(cube_mask(8).sum(), 64.0);
        assert_eq!(corner_mask(10).sum(), 16.0);
    }
}
