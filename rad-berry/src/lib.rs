#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供 3D 医学影像 (MRI/CT) 体数据的交互式切片浏览, 多掩膜叠加与动画导出.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 核心浏览器只处理内存中的 [`Volume`]. 文件格式的读写位于 [`io`],
//!   预处理滤波位于 [`process`], 它们都不属于浏览器本身.
//! 2. 库内部从不探测运行环境. 交互/批处理由调用方通过 [`Environment`] 一次性给出.
//! 3. 所有渲染与翻页都在调用线程上同步完成, 不存在后台线程或异步调度.
//!
//! # 模块概览
//!
//! ### 体数据与切片视图 ✅
//!
//! 只读体数据 [`Volume`], 全局强度窗口 [`IntensityWindow`], 以及借用的二维切片
//! [`VolumeSlice`]. 轴 0/1/2 分别沿第一/二/三维选取切片.
//!
//! 实现位于 `rad-berry/src/data`.
//!
//! ### 掩膜注册表 ✅
//!
//! 颜色名, 十六进制颜色与内置色图的解析; 注册时即完成形状与参数检查.
//! 值为 0 的体素永远不会覆盖底图.
//!
//! 实现位于 `rad-berry/src/overlay`.
//!
//! ### 渲染 ✅
//!
//! [`RenderHandle`] 持有底图层与掩膜层, 翻页时原地更新;
//! [`Canvas`] 按画布比例坐标排布图像与滑块.
//!
//! 实现位于 `rad-berry/src/render`.
//!
//! ### 浏览器与浏览器组 ✅
//!
//! [`Viewer`] 组合上述组件, 提供显示, 翻页, 快照与导出 (gif 动画, 静态帧).
//! [`ViewerGroup`] 以网格排列多个浏览器并同步翻页.
//!
//! 实现位于 `rad-berry/src/viewer`.
//!
//! ### 交互式窗口 ⌛️
//!
//! `plot` feature 下以 opencv trackbar 充当显示宿主.
//!
//! # 示例
//!
//! ```no_run
//! use ndarray::{s, Array3};
//! use rad_berry::{Viewer, Volume};
//!
//! let volume = Volume::new(Array3::<f32>::zeros((10, 10, 10)));
//! let mut mask = Array3::<f32>::zeros((10, 10, 10));
//! mask.slice_mut(s![3..7, 3..7, 3..7]).fill(1.0);
//!
//! let mut viewer = Viewer::new(volume, 0).unwrap();
//! viewer.add_mask(&mask, "red", 0.3).unwrap();
//! let report = viewer.save_animation("out.gif", 30.0).unwrap();
//! assert_eq!(report.frames, 10);
//! ```

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 体数据基础数据结构.
mod data;

pub use data::{ImgWriteVis, IntensityWindow, Volume, VolumeSlice};

pub mod consts;

pub mod error;

pub use error::{ExportError, LoadError, SliceError, SliceResult};

pub mod overlay;

pub use overlay::{ColorSpec, Colormap, MaskInput, MaskOverlay, MaskRegistry, NamedColormap, Rgba};

pub mod render;

pub use render::{Canvas, FigureSize, Panel, Rect, RenderHandle};

pub mod viewer;

pub use viewer::{Environment, ExportReport, PositionController, Viewer, ViewerConfig, ViewerGroup};

#[cfg(feature = "plot")]
pub use viewer::plot::ImgDisplay;

pub mod io;
pub mod process;
pub mod prelude;
