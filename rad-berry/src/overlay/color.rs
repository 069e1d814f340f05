//! 颜色与颜色名解析.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 8-bit RGBA 颜色.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// 完全透明.
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    /// 不透明黑色.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// 不透明白色.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// 不透明颜色.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
        Rgba([r, g, b, 255])
    }

    /// 单通道灰度对应的不透明颜色.
    #[inline]
    pub const fn gray(v: u8) -> Rgba {
        Rgba::rgb(v, v, v)
    }

    /// 替换 alpha 通道.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Rgba {
        let [r, g, b, _] = self.0;
        Rgba([r, g, b, a])
    }

    /// alpha 通道.
    #[inline]
    pub const fn alpha(&self) -> u8 {
        self.0[3]
    }

    /// 以 `opacity` (会再乘以自身 alpha) 将 `self` 叠加到不透明的 `base` 上.
    /// 结果总是不透明的.
    pub fn over(self, base: Rgba, opacity: f32) -> Rgba {
        let a = (opacity * self.alpha() as f32 / 255.0).clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (bg as f32 * (1.0 - a) + fg as f32 * a).round() as u8;
        Rgba([
            mix(self.0[0], base.0[0]),
            mix(self.0[1], base.0[1]),
            mix(self.0[2], base.0[2]),
            255,
        ])
    }

    /// 解析颜色名 (如 `"red"`, `"r"`, `"tab:blue"`) 或十六进制颜色
    /// (`#rgb`, `#rrggbb`, `#rrggbbaa`). 不区分大小写. 无法解析时返回 `None`.
    pub fn parse(s: &str) -> Option<Rgba> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let key = s.to_ascii_lowercase();
        NAMED_COLORS.get(key.as_str()).copied()
    }
}

impl From<Rgba> for image::Rgba<u8> {
    #[inline]
    fn from(value: Rgba) -> Self {
        image::Rgba(value.0)
    }
}

impl From<image::Rgba<u8>> for Rgba {
    #[inline]
    fn from(value: image::Rgba<u8>) -> Self {
        Rgba(value.0)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

/// 已知颜色名. 包括单字母简写, 常见颜色名与 tableau 调色板.
static NAMED_COLORS: Lazy<HashMap<&'static str, Rgba>> = Lazy::new(|| {
    HashMap::from([
        ("b", Rgba::rgb(0, 0, 255)),
        ("g", Rgba::rgb(0, 128, 0)),
        ("r", Rgba::rgb(255, 0, 0)),
        ("c", Rgba::rgb(0, 191, 191)),
        ("m", Rgba::rgb(191, 0, 191)),
        ("y", Rgba::rgb(191, 191, 0)),
        ("k", Rgba::BLACK),
        ("w", Rgba::WHITE),
        ("red", Rgba::rgb(255, 0, 0)),
        ("green", Rgba::rgb(0, 128, 0)),
        ("blue", Rgba::rgb(0, 0, 255)),
        ("yellow", Rgba::rgb(255, 255, 0)),
        ("cyan", Rgba::rgb(0, 255, 255)),
        ("aqua", Rgba::rgb(0, 255, 255)),
        ("magenta", Rgba::rgb(255, 0, 255)),
        ("fuchsia", Rgba::rgb(255, 0, 255)),
        ("black", Rgba::BLACK),
        ("white", Rgba::WHITE),
        ("gray", Rgba::rgb(128, 128, 128)),
        ("grey", Rgba::rgb(128, 128, 128)),
        ("silver", Rgba::rgb(192, 192, 192)),
        ("orange", Rgba::rgb(255, 165, 0)),
        ("purple", Rgba::rgb(128, 0, 128)),
        ("pink", Rgba::rgb(255, 192, 203)),
        ("brown", Rgba::rgb(165, 42, 42)),
        ("lime", Rgba::rgb(0, 255, 0)),
        ("navy", Rgba::rgb(0, 0, 128)),
        ("teal", Rgba::rgb(0, 128, 128)),
        ("olive", Rgba::rgb(128, 128, 0)),
        ("maroon", Rgba::rgb(128, 0, 0)),
        ("gold", Rgba::rgb(255, 215, 0)),
        ("tab:blue", Rgba::rgb(31, 119, 180)),
        ("tab:orange", Rgba::rgb(255, 127, 14)),
        ("tab:green", Rgba::rgb(44, 160, 44)),
        ("tab:red", Rgba::rgb(214, 39, 40)),
        ("tab:purple", Rgba::rgb(148, 103, 189)),
        ("tab:brown", Rgba::rgb(140, 86, 75)),
        ("tab:pink", Rgba::rgb(227, 119, 194)),
        ("tab:gray", Rgba::rgb(127, 127, 127)),
        ("tab:olive", Rgba::rgb(188, 189, 34)),
        ("tab:cyan", Rgba::rgb(23, 190, 207)),
    ])
});
