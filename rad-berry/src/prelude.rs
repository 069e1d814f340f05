//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{ImgWriteVis, IntensityWindow, Volume, VolumeSlice};

pub use crate::error::{SliceError, SliceResult};

pub use crate::overlay::{ColorSpec, Colormap, NamedColormap, Rgba};

pub use crate::viewer::{Environment, ExportReport, Viewer, ViewerConfig, ViewerGroup};

#[cfg(feature = "plot")]
pub use crate::viewer::plot::{run_interactive, ImgDisplay};

pub use crate::consts::{DEFAULT_FPS, DEFAULT_MASK_COLOR, DEFAULT_MASK_OPACITY};

pub use crate::io::{home_dataset_dir_with, load_image, save_npy};
pub use crate::process;
