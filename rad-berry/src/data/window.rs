/// 强度窗口, 由下限和上限确定.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
/// 切片渲染时底图使用整个体数据的 `[min, max]` 作为窗口, 掩膜使用 `[0, max(mask)]`,
/// 因此逐帧播放时对比度保持稳定.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntensityWindow {
    lower: f32,
    upper: f32,
}

impl IntensityWindow {
    /// 由下限与上限构建强度窗. `upper < lower` 或存在非有限值时返回 `None`.
    pub fn from_range(lower: f32, upper: f32) -> Option<IntensityWindow> {
        if !lower.is_finite() || !upper.is_finite() || upper < lower {
            return None;
        }
        Some(Self { lower, upper })
    }

    /// 宽度为 0 的窗口. 所有有限值都映射到下限.
    #[inline]
    pub const fn point(level: f32) -> IntensityWindow {
        Self {
            lower: level,
            upper: level,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.lower
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.upper
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.lower + (self.upper - self.lower) / 2.0
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// 求 `v` 在当前窗口下的归一化位置 (0.0 <= value <= 1.0).
    ///
    /// 窗宽为 0 时所有有限值都映射到 0.0. 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_unit(&self, v: f32) -> Option<f32> {
        if !v.is_finite() {
            return None;
        }
        if self.upper <= self.lower {
            return Some(0.0);
        }
        if v <= self.lower {
            Some(0.0)
        } else if v >= self.upper {
            Some(1.0)
        } else {
            Some((v - self.lower) / (self.upper - self.lower))
        }
    }

    /// 求 `v` 对应的灰度图像素整数值 (0 <= value <= 255).
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    #[inline]
    pub fn eval(&self, v: f32) -> Option<u8> {
        // 255, not 256.
        self.eval_unit(v).map(|t| (t * 255.0) as u8)
    }
}
