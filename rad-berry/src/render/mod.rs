//! 切片渲染. [`RenderHandle`] 持有底图层与掩膜层, 翻页时原地更新各层数据.

use image::RgbaImage;
use ndarray::{Array2, ArrayView2, Zip};

use crate::consts::gray::is_mask_background;
use crate::error::SliceResult;
use crate::overlay::{Colormap, MaskOverlay, MaskRegistry, Rgba};
use crate::{IntensityWindow, Volume};

pub mod figure;

pub use figure::{Canvas, FigureSize, Panel, Rect};

/// 底图层: 当前切片及其固定的全局强度窗口.
#[derive(Clone, Debug)]
pub struct ImageLayer {
    data: Array2<f32>,
    window: IntensityWindow,
    colormap: Colormap,
}

impl ImageLayer {
    /// 当前切片数据.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 固定的强度窗口 (整个体数据的 `[min, max]`).
    #[inline]
    pub fn window(&self) -> IntensityWindow {
        self.window
    }

    /// 底图色图.
    #[inline]
    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    /// 强度 `v` 对应的颜色. 非有限值绘制为黑色.
    #[inline]
    fn color_at(&self, v: f32) -> Rgba {
        self.window
            .eval_unit(v)
            .map_or(Rgba::BLACK, |t| self.colormap.eval(t))
    }

    /// 渲染为不透明的 RGBA 图像.
    pub fn rgba(&self) -> RgbaImage {
        let (h, w) = self.data.dim();
        RgbaImage::from_fn(w as u32, h as u32, |x, y| {
            self.color_at(self.data[(y as usize, x as usize)]).into()
        })
    }
}

/// 掩膜层: 某个掩膜在当前切片上的数据.
#[derive(Clone, Debug)]
pub struct MaskLayer {
    data: Array2<f32>,
    window: IntensityWindow,
    colormap: Colormap,
    opacity: f32,
}

impl MaskLayer {
    fn new(overlay: &MaskOverlay, slice: ArrayView2<'_, f32>) -> Self {
        Self {
            data: slice.to_owned(),
            window: overlay.window(),
            colormap: overlay.colormap().clone(),
            opacity: overlay.opacity(),
        }
    }

    /// 当前切片上的掩膜数据.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 不透明度.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// 体素 `v` 的颜色. 背景体素返回 `None`.
    #[inline]
    fn color_at(&self, v: f32) -> Option<Rgba> {
        if is_mask_background(v) {
            return None;
        }
        Some(self.colormap.eval(self.window.eval_unit(v).unwrap_or(0.0)))
    }

    /// 渲染为 RGBA 图像. 背景体素完全透明, 其余体素的 alpha 为 `opacity`.
    pub fn rgba(&self) -> RgbaImage {
        let (h, w) = self.data.dim();
        let alpha = (self.opacity * 255.0).round() as u8;
        RgbaImage::from_fn(w as u32, h as u32, |x, y| {
            match self.color_at(self.data[(y as usize, x as usize)]) {
                None => Rgba::TRANSPARENT,
                Some(c) => c.with_alpha(((c.alpha() as u16 * alpha as u16) / 255) as u8),
            }
            .into()
        })
    }
}

/// 某个轴上的渲染句柄.
///
/// 首次渲染由 [`RenderHandle::create`] 完成; 之后翻页只通过 [`RenderHandle::update`]
/// 替换各层的数据, 色图, 强度窗口与层的个数/顺序均保持不变.
#[derive(Clone, Debug)]
pub struct RenderHandle {
    axis: usize,
    index: usize,
    image: ImageLayer,
    masks: Vec<MaskLayer>,
    updates: usize,
}

impl RenderHandle {
    /// 为 `axis` 上第 `index` 层创建全部图层.
    ///
    /// 体数据维数不为 3 时返回 [`crate::SliceError::UnsupportedRank`].
    pub fn create(
        volume: &Volume,
        masks: &MaskRegistry,
        colormap: &Colormap,
        axis: usize,
        index: usize,
    ) -> SliceResult<Self> {
        let slice = volume.slice_at(index, axis)?;
        let image = ImageLayer {
            data: slice.to_owned(),
            window: volume.window(),
            colormap: colormap.clone(),
        };
        let masks = masks
            .overlays()
            .iter()
            .map(|m| Ok(MaskLayer::new(m, m.slice_at(index, axis)?)))
            .collect::<SliceResult<Vec<_>>>()?;
        log::debug!("创建渲染句柄: axis = {axis}, index = {index}, {} 个掩膜层", masks.len());
        Ok(Self {
            axis,
            index,
            image,
            masks,
            updates: 0,
        })
    }

    /// 原地切换到第 `index` 层. 失败时句柄保持不变.
    pub fn update(&mut self, volume: &Volume, registry: &MaskRegistry, index: usize) -> SliceResult<()> {
        let slice = volume.slice_at(index, self.axis)?;
        let overlays = registry.overlays();
        let slices = overlays
            .iter()
            .map(|m| m.slice_at(index, self.axis))
            .collect::<SliceResult<Vec<_>>>()?;

        self.image.data.assign(&slice.data());
        for (layer, s) in self.masks.iter_mut().zip(slices) {
            layer.data.assign(&s);
        }
        self.index = index;
        self.updates += 1;
        log::debug!("切换到 axis = {}, index = {index}", self.axis);
        Ok(())
    }

    /// 在末尾追加一个掩膜层, 使用当前的切片位置.
    pub fn attach_mask(&mut self, overlay: &MaskOverlay) -> SliceResult<()> {
        let slice = overlay.slice_at(self.index, self.axis)?;
        self.masks.push(MaskLayer::new(overlay, slice));
        Ok(())
    }

    /// 移除第 `pos` 个掩膜层.
    pub fn detach_mask(&mut self, pos: usize) -> Option<MaskLayer> {
        (pos < self.masks.len()).then(|| self.masks.remove(pos))
    }

    /// 移除全部掩膜层.
    #[inline]
    pub fn detach_all(&mut self) {
        self.masks.clear();
    }

    /// 切片所在轴.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// 当前切片位置.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 底图层.
    #[inline]
    pub fn image(&self) -> &ImageLayer {
        &self.image
    }

    /// 掩膜层, 按绘制顺序.
    #[inline]
    pub fn masks(&self) -> &[MaskLayer] {
        &self.masks
    }

    /// 自创建以来原地更新的次数.
    #[inline]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// 合成当前切片: 底图之上按顺序叠加各掩膜层. 掩膜背景体素不改变底图.
    pub fn composite(&self) -> RgbaImage {
        let (h, w) = self.image.data.dim();
        let mut out = Array2::<Rgba>::from_elem((h, w), Rgba::TRANSPARENT);
        Zip::from(&mut out)
            .and(&self.image.data)
            .for_each(|px, &v| *px = self.image.color_at(v));
        for layer in &self.masks {
            Zip::from(&mut out).and(&layer.data).for_each(|px, &v| {
                if let Some(c) = layer.color_at(v) {
                    *px = c.over(*px, layer.opacity);
                }
            });
        }
        RgbaImage::from_fn(w as u32, h as u32, |x, y| out[(y as usize, x as usize)].into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SliceError;
    use image::Rgba as Pixel;
    use ndarray::{s, Array, Array2, Array3};

    fn ramp() -> Volume {
        Volume::new(
            Array::from_iter((0..24).map(|v| v as f32))
                .into_shape((2, 3, 4))
                .unwrap(),
        )
    }

    fn cube_mask() -> Array3<f32> {
        let mut mask = Array3::<f32>::zeros((6, 6, 6));
        mask.slice_mut(s![2..4, 2..4, 2..4]).fill(1.0);
        mask
    }

    #[test]
    fn test_create_uses_global_window() {
        let volume = ramp();
        let registry = MaskRegistry::new(volume.shape());
        let handle = RenderHandle::create(&volume, &registry, &Colormap::default(), 0, 1).unwrap();
        assert_eq!(handle.image().window(), volume.window());
        let img = handle.composite();
        assert_eq!(img.dimensions(), (4, 3));
        // 12 / 23 * 255 -> 133.
        assert_eq!(img.get_pixel(0, 0), &Pixel([133, 133, 133, 255]));
        assert_eq!(img.get_pixel(3, 2), &Pixel([255, 255, 255, 255]));
    }

    #[test]
    fn test_non_3d_rejected() {
        let volume = Volume::new(Array2::<f32>::zeros((3, 3)));
        let registry = MaskRegistry::new(volume.shape());
        assert_eq!(
            RenderHandle::create(&volume, &registry, &Colormap::default(), 0, 0).unwrap_err(),
            SliceError::UnsupportedRank(2)
        );
    }

    #[test]
    fn test_update_in_place() {
        let volume = ramp();
        let mut registry = MaskRegistry::new(volume.shape());
        registry.register(volume.to_array(), "blue", 0.5).unwrap();
        let mut handle = RenderHandle::create(&volume, &registry, &Colormap::default(), 2, 0).unwrap();
        let ptr = handle.image().data().as_ptr();

        handle.update(&volume, &registry, 3).unwrap();
        assert_eq!(handle.index(), 3);
        assert_eq!(handle.updates(), 1);
        assert_eq!(handle.image().data().as_ptr(), ptr);
        assert_eq!(handle.image().data(), volume.slice_at(3, 2).unwrap().data());
        assert_eq!(handle.masks()[0].data(), volume.slice_at(3, 2).unwrap().data());

        assert!(handle.update(&volume, &registry, 4).is_err());
        assert_eq!(handle.index(), 3);
        assert_eq!(handle.updates(), 1);
    }

    #[test]
    fn test_mask_zero_is_transparent() {
        let volume = Volume::new(Array3::<f32>::zeros((6, 6, 6)));
        let red = Rgba::rgb(255, 0, 0);
        for opacity in [0.1, 0.5, 0.9] {
            let mut registry = MaskRegistry::new(volume.shape());
            registry.register(cube_mask(), "red", opacity).unwrap();
            let handle = RenderHandle::create(&volume, &registry, &Colormap::default(), 0, 2).unwrap();

            let layer = handle.masks()[0].rgba();
            assert_eq!(layer.get_pixel(0, 0)[3], 0);
            assert_eq!(layer.get_pixel(2, 2)[3], (opacity * 255.0).round() as u8);

            let img = handle.composite();
            assert_eq!(img.get_pixel(0, 0), &Pixel::<u8>::from(Rgba::BLACK));
            assert_eq!(img.get_pixel(2, 2), &Pixel::<u8>::from(red.over(Rgba::BLACK, opacity)));
            assert_ne!(img.get_pixel(2, 2), &Pixel::<u8>::from(Rgba::BLACK));
        }
    }

    #[test]
    fn test_later_mask_paints_over_earlier() {
        let volume = Volume::new(Array3::<f32>::zeros((6, 6, 6)));
        let mut registry = MaskRegistry::new(volume.shape());
        registry.register(cube_mask(), "red", 1.0).unwrap();
        registry.register(cube_mask(), "blue", 1.0).unwrap();
        let mut handle = RenderHandle::create(&volume, &registry, &Colormap::default(), 1, 3).unwrap();
        assert_eq!(handle.composite().get_pixel(3, 3), &Pixel([0, 0, 255, 255]));

        handle.detach_mask(1).unwrap();
        assert_eq!(handle.composite().get_pixel(3, 3), &Pixel([255, 0, 0, 255]));
        handle.detach_all();
        assert_eq!(handle.composite().get_pixel(3, 3), &Pixel::<u8>::from(Rgba::BLACK));
    }
}
