//! 色图: 将 `[0, 1]` 内的归一化强度映射为颜色.

use super::Rgba;

/// 内置的连续色图.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NamedColormap {
    /// 黑 -> 白.
    Gray,
    /// 带蓝色调的灰度.
    Bone,
    /// 黑 -> 红 -> 黄 -> 白.
    Hot,
    /// 深蓝 -> 青 -> 黄 -> 深红.
    Jet,
    /// 感知均匀的紫 -> 绿 -> 黄.
    Viridis,
    /// 白 -> 深红.
    Reds,
    /// 白 -> 深蓝.
    Blues,
    /// 白 -> 深绿.
    Greens,
}

impl NamedColormap {
    /// 全部内置色图.
    pub const ALL: [NamedColormap; 8] = [
        Self::Gray,
        Self::Bone,
        Self::Hot,
        Self::Jet,
        Self::Viridis,
        Self::Reds,
        Self::Blues,
        Self::Greens,
    ];

    /// 按名称查找 (不区分大小写, `grey` 等价于 `gray`).
    pub fn from_name(name: &str) -> Option<NamedColormap> {
        let name = name.trim().to_ascii_lowercase();
        if name == "grey" {
            return Some(Self::Gray);
        }
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// 色图名.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Bone => "bone",
            Self::Hot => "hot",
            Self::Jet => "jet",
            Self::Viridis => "viridis",
            Self::Reds => "reds",
            Self::Blues => "blues",
            Self::Greens => "greens",
        }
    }

    /// 分段线性插值的锚点, 按位置升序.
    const fn anchors(&self) -> &'static [(f32, [u8; 3])] {
        match self {
            Self::Gray => &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])],
            Self::Bone => &[
                (0.0, [0, 0, 0]),
                (0.375, [81, 81, 113]),
                (0.75, [166, 198, 198]),
                (1.0, [255, 255, 255]),
            ],
            Self::Hot => &[
                (0.0, [11, 0, 0]),
                (0.365, [255, 0, 0]),
                (0.746, [255, 255, 0]),
                (1.0, [255, 255, 255]),
            ],
            Self::Jet => &[
                (0.0, [0, 0, 128]),
                (0.125, [0, 0, 255]),
                (0.375, [0, 255, 255]),
                (0.625, [255, 255, 0]),
                (0.875, [255, 0, 0]),
                (1.0, [128, 0, 0]),
            ],
            Self::Viridis => &[
                (0.0, [68, 1, 84]),
                (0.25, [59, 82, 139]),
                (0.5, [33, 145, 140]),
                (0.75, [94, 201, 98]),
                (1.0, [253, 231, 37]),
            ],
            Self::Reds => &[(0.0, [255, 245, 240]), (0.5, [251, 106, 74]), (1.0, [103, 0, 13])],
            Self::Blues => &[(0.0, [247, 251, 255]), (0.5, [107, 174, 214]), (1.0, [8, 48, 107])],
            Self::Greens => &[(0.0, [247, 252, 245]), (0.5, [116, 196, 118]), (1.0, [0, 68, 27])],
        }
    }

    /// 求 `t` (会被截断到 `[0, 1]`) 处的颜色.
    pub fn eval(&self, t: f32) -> Rgba {
        let anchors = self.anchors();
        let t = t.clamp(0.0, 1.0);
        let upper = anchors.iter().position(|(p, _)| *p >= t).unwrap_or(anchors.len() - 1);
        if upper == 0 {
            let [r, g, b] = anchors[0].1;
            return Rgba::rgb(r, g, b);
        }
        let (p0, c0) = anchors[upper - 1];
        let (p1, c1) = anchors[upper];
        let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
        Rgba::rgb(lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2]))
    }
}

/// 色图. 要么是内置的连续色图, 要么是离散颜色表.
///
/// 单个纯色等价于只含一种颜色的颜色表: 任何非零掩膜值都绘制为该颜色.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colormap {
    /// 内置连续色图.
    Named(NamedColormap),

    /// 离散颜色表. 区间 `[0, 1]` 被等分为 `len` 段, 每段一种颜色.
    Listed(Vec<Rgba>),
}

impl Colormap {
    /// 只含一种颜色的色图.
    #[inline]
    pub fn flat(color: Rgba) -> Colormap {
        Self::Listed(vec![color])
    }

    /// 按名称查找内置色图.
    #[inline]
    pub fn from_name(name: &str) -> Option<Colormap> {
        NamedColormap::from_name(name).map(Self::Named)
    }

    /// 求 `t` 处的颜色. `t` 为 NaN 时返回透明色; 空颜色表总是返回透明色.
    pub fn eval(&self, t: f32) -> Rgba {
        if t.is_nan() {
            return Rgba::TRANSPARENT;
        }
        match self {
            Self::Named(named) => named.eval(t),
            Self::Listed(colors) if colors.is_empty() => Rgba::TRANSPARENT,
            Self::Listed(colors) => {
                let n = colors.len();
                let i = ((t.clamp(0.0, 1.0) * n as f32) as usize).min(n - 1);
                colors[i]
            }
        }
    }
}

impl Default for Colormap {
    #[inline]
    fn default() -> Self {
        Self::Named(NamedColormap::Gray)
    }
}

impl From<NamedColormap> for Colormap {
    #[inline]
    fn from(value: NamedColormap) -> Self {
        Self::Named(value)
    }
}
