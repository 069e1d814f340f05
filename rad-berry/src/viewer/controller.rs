//! 切片位置控制器: 当前索引的唯一来源, 以及修改索引的机制.

use crate::consts::layout;
use crate::error::{SliceError, SliceResult};
use crate::render::Rect;

/// 运行环境. 由调用方在构造时一次性给出, 库内部从不探测.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Environment {
    /// 存在可交互的显示宿主, 用户拖动滑块即回调浏览器.
    Interactive,

    /// 没有交互控件, 索引只由程序驱动 (如动画导出).
    #[default]
    Batch,
}

/// 交互式滑块的状态. 仅描述几何与取值, 真正的控件由显示宿主绘制.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    rect: Rect,
    max: usize,
    value: usize,
    label: String,
}

impl Slider {
    /// 画布比例坐标下的位置.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// 最大取值 (`extent - 1`).
    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    /// 当前取值.
    #[inline]
    pub fn value(&self) -> usize {
        self.value
    }

    /// 标签.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 当前取值在 `[0, max]` 中的比例. `max == 0` 时为 1.
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            1.0
        } else {
            self.value as f32 / self.max as f32
        }
    }
}

/// 控件. 交互环境下为滑块, 否则没有控件.
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    /// 绑定了回调的滑块.
    Interactive(Slider),

    /// 仅索引.
    Batch,
}

/// 位置控制器.
#[derive(Clone, Debug)]
pub struct PositionController {
    env: Environment,
    axis: usize,
    index: usize,
    extent: usize,
    control: Control,
    gap: f32,
    height: f32,
    explicit: Option<Rect>,
    host: Option<(Rect, String)>,
}

impl PositionController {
    /// 创建控制器. 控件在 [`PositionController::attach`] 之前不存在.
    pub fn new(env: Environment, axis: usize, extent: usize) -> Self {
        Self {
            env,
            axis,
            index: 0,
            extent,
            control: Control::Batch,
            gap: layout::SLIDER_GAP,
            height: layout::SLIDER_HEIGHT,
            explicit: None,
            host: None,
        }
    }

    /// 运行环境.
    #[inline]
    pub fn environment(&self) -> Environment {
        self.env
    }

    /// 当前索引.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 轴长度.
    #[inline]
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// 当前控件.
    #[inline]
    pub fn control(&self) -> &Control {
        &self.control
    }

    /// 当前滑块 (若存在).
    #[inline]
    pub fn slider(&self) -> Option<&Slider> {
        match &self.control {
            Control::Interactive(s) => Some(s),
            Control::Batch => None,
        }
    }

    /// 滑块下移量.
    #[inline]
    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// 滑块高度.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// 检查索引是否位于 `[0, extent)` 内.
    pub fn check(&self, index: i64) -> SliceResult<usize> {
        match usize::try_from(index) {
            Ok(i) if i < self.extent => Ok(i),
            _ => Err(SliceError::IndexOutOfBounds {
                index,
                axis: self.axis,
                extent: self.extent,
            }),
        }
    }

    /// 设置索引, 同步滑块取值. 越界时状态不变.
    pub fn set(&mut self, index: usize) -> SliceResult<()> {
        let index = self.check(index.try_into().unwrap_or(i64::MAX))?;
        self.index = index;
        if let Control::Interactive(slider) = &mut self.control {
            slider.value = index;
        }
        Ok(())
    }

    /// 绑定到宿主图像区域. 交互环境且 `show_slider` 时创建 (或替换) 滑块,
    /// 否则不创建任何控件.
    pub fn attach(&mut self, host: Rect, label: impl Into<String>, show_slider: bool) {
        self.host = Some((host, label.into()));
        if show_slider {
            self.rebuild();
        } else {
            self.control = Control::Batch;
        }
    }

    /// 修改滑块下移量. 若控件已存在, 重新创建它.
    pub fn set_gap(&mut self, gap: f32) {
        self.gap = gap;
        self.refresh();
    }

    /// 修改滑块高度. 若控件已存在, 重新创建它.
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.refresh();
    }

    /// 指定 (或以 `None` 取消) 显式滑块位置. 若控件已存在, 重新创建它.
    pub fn set_geometry(&mut self, rect: Option<Rect>) {
        self.explicit = rect;
        self.refresh();
    }

    /// 移除交互控件. 之后索引仍可由程序修改.
    pub fn remove_control(&mut self) {
        if matches!(self.control, Control::Interactive(_)) {
            log::debug!("移除轴 {} 的滑块", self.axis);
        }
        self.control = Control::Batch;
    }

    /// 恢复交互控件 (如果环境允许且已绑定宿主).
    pub fn restore_control(&mut self) {
        if self.slider().is_none() {
            self.rebuild();
        }
    }

    /// 当前应使用的滑块位置: 显式位置优先, 否则由宿主区域推算. 未绑定宿主时为 `None`.
    pub fn geometry(&self) -> Option<Rect> {
        self.explicit.or_else(|| {
            self.host
                .as_ref()
                .map(|(host, _)| auto_geometry(host, self.gap, self.height))
        })
    }

    fn refresh(&mut self) {
        if self.slider().is_some() {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        if self.env != Environment::Interactive {
            self.control = Control::Batch;
            return;
        }
        let (Some(rect), Some((_, label))) = (self.geometry(), self.host.as_ref()) else {
            return;
        };
        let slider = Slider {
            rect,
            max: self.extent.saturating_sub(1),
            value: self.index,
            label: format!("{label}: Slice"),
        };
        log::debug!("轴 {} 的滑块位于 {:?}", self.axis, slider.rect);
        self.control = Control::Interactive(slider);
    }
}

/// 由宿主区域推算滑块位置: 左右各缩进一段, 并下移 `gap`.
pub fn auto_geometry(host: &Rect, gap: f32, height: f32) -> Rect {
    Rect::new(
        host.x0 + layout::SLIDER_INSET,
        host.y0 - gap,
        host.width - 2.0 * layout::SLIDER_INSET,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    fn host() -> Rect {
        Rect::new(0.125, 0.2, 0.775, 0.68)
    }

    #[test]
    fn test_bounds() {
        let mut ctl = PositionController::new(Environment::Batch, 1, 5);
        assert_eq!(ctl.check(0), Ok(0));
        assert_eq!(ctl.check(4), Ok(4));
        assert_eq!(
            ctl.check(-1),
            Err(SliceError::IndexOutOfBounds { index: -1, axis: 1, extent: 5 })
        );
        assert!(ctl.check(5).is_err());
        assert!(ctl.set(5).is_err());
        ctl.set(3).unwrap();
        assert_eq!(ctl.index(), 3);
    }

    #[test]
    fn test_batch_has_no_control() {
        let mut ctl = PositionController::new(Environment::Batch, 0, 5);
        ctl.attach(host(), "Axis: 0", true);
        assert_eq!(ctl.control(), &Control::Batch);
        assert!(ctl.geometry().is_some());
    }

    #[test]
    fn test_auto_geometry() {
        let mut ctl = PositionController::new(Environment::Interactive, 0, 5);
        ctl.set(2).unwrap();
        ctl.attach(host(), "Axis: 0", true);
        let slider = ctl.slider().unwrap();
        assert!(float_eq(slider.rect().x0, 0.225));
        assert!(float_eq(slider.rect().y0, 0.05));
        assert!(float_eq(slider.rect().width, 0.575));
        assert!(float_eq(slider.rect().height, 0.03));
        assert_eq!(slider.max(), 4);
        assert_eq!(slider.value(), 2);
        assert_eq!(slider.label(), "Axis: 0: Slice");
        assert!(float_eq(slider.fraction(), 0.5));
    }

    #[test]
    fn test_gap_change_replaces_control() {
        let mut ctl = PositionController::new(Environment::Interactive, 0, 5);
        // 未绑定宿主时只记录参数.
        ctl.set_gap(0.1);
        assert!(ctl.slider().is_none());

        ctl.attach(host(), "t", true);
        assert!(float_eq(ctl.slider().unwrap().rect().y0, 0.1));
        ctl.set_gap(0.18);
        assert!(float_eq(ctl.slider().unwrap().rect().y0, 0.02));
        ctl.set_height(0.05);
        assert!(float_eq(ctl.slider().unwrap().rect().height, 0.05));

        let explicit = Rect::new(0.1, 0.01, 0.8, 0.02);
        ctl.set_geometry(Some(explicit));
        assert_eq!(ctl.slider().unwrap().rect(), explicit);
    }

    #[test]
    fn test_remove_control_keeps_index_mode() {
        let mut ctl = PositionController::new(Environment::Interactive, 0, 5);
        ctl.attach(host(), "t", true);
        ctl.remove_control();
        assert!(ctl.slider().is_none());
        ctl.set_gap(0.2);
        assert!(ctl.slider().is_none());
        ctl.set(4).unwrap();
        assert_eq!(ctl.index(), 4);

        ctl.restore_control();
        assert_eq!(ctl.slider().unwrap().value(), 4);
    }
}
