//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 掩膜中代表 "不属于该掩膜" 的体素值. 该位置在渲染时完全透明.
    pub const MASK_BACKGROUND: f32 = 0.0;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 掩膜体素是否为背景 (即不绘制)?
    #[inline]
    pub fn is_mask_background(v: f32) -> bool {
        v == MASK_BACKGROUND
    }
}

/// 画布布局常量. 坐标均为画布比例坐标, 原点位于左下角.
pub mod layout {
    /// 默认画布尺寸 (英寸, 宽 x 高).
    pub const DEFAULT_FIGURE_SIZE: (f32, f32) = (4.0, 4.0);

    /// 默认每英寸像素数.
    pub const DEFAULT_DPI: f32 = 100.0;

    /// 单个浏览器面板的左边界.
    pub const SINGLE_LEFT: f32 = 0.125;

    /// 单个浏览器面板的下边界. 为滑块预留空间.
    pub const SINGLE_BOTTOM: f32 = 0.2;

    /// 单个浏览器面板的右边界.
    pub const SINGLE_RIGHT: f32 = 0.9;

    /// 单个浏览器面板的上边界.
    pub const SINGLE_TOP: f32 = 0.88;

    /// 网格布局的左边界.
    pub const GRID_LEFT: f32 = 0.125;

    /// 网格布局的右边界.
    pub const GRID_RIGHT: f32 = 0.9;

    /// 网格布局的下边界.
    pub const GRID_BOTTOM: f32 = 0.11;

    /// 网格布局的上边界.
    pub const GRID_TOP: f32 = 0.88;

    /// 网格列间距, 以单元平均宽度为单位.
    pub const GRID_WSPACE: f32 = 0.2;

    /// 网格行间距, 以单元平均高度为单位.
    pub const GRID_HSPACE: f32 = 0.2;

    /// 滑块相对宿主面板的默认下移量.
    pub const SLIDER_GAP: f32 = 0.15;

    /// 滑块默认高度.
    pub const SLIDER_HEIGHT: f32 = 0.03;

    /// 滑块相对宿主面板的左右缩进.
    pub const SLIDER_INSET: f32 = 0.1;
}

/// 默认掩膜颜色.
pub const DEFAULT_MASK_COLOR: &str = "red";

/// 默认掩膜不透明度.
pub const DEFAULT_MASK_OPACITY: f32 = 0.5;

/// 默认动画帧率.
pub const DEFAULT_FPS: f32 = 10.0;
