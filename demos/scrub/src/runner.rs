//! 程序运行函数.

use rad_berry::prelude::*;
use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use utils::loader;

use crate::phantom;
use crate::result::ScrubResult;

/// 合成体模的边长.
const PHANTOM_SIZE: usize = 48;

/// 静态图像的 dpi.
const FIGURE_DPI: f32 = 40.0;

fn out_dir() -> PathBuf {
    env::var("RADVIS_OUT").map_or_else(|_| PathBuf::from("scrub-out"), PathBuf::from)
}

/// 加载体数据与掩膜. 没有真实数据时使用合成体模.
fn load() -> Result<(Volume, Vec<(Volume, &'static str, f32)>), Box<dyn Error>> {
    if let Some(image) = loader::image_from_env_or_home() {
        let image = image?;
        let mut masks = Vec::new();
        if let Some(mask) = loader::mask_from_env_or_home() {
            masks.push((mask?, "jet", 0.4));
        }
        return Ok((image, masks));
    }

    log::info!("未找到体数据, 使用 {PHANTOM_SIZE}^3 合成体模");
    let image = Volume::new(phantom::sphere(PHANTOM_SIZE));
    let masks = vec![
        (Volume::new(phantom::cube_mask(PHANTOM_SIZE)), "red", 0.3),
        (Volume::new(phantom::corner_mask(PHANTOM_SIZE)), "#00ff00", 0.6),
    ];
    Ok((image, masks))
}

/// 实际运行.
pub fn run() -> Result<ScrubResult, Box<dyn Error>> {
    let (image, masks) = load()?;
    utils::describe("image", &image);
    let image = process::percentile_clipping(&image, 0.5, 99.5)?;

    let dir = out_dir();
    fs::create_dir_all(&dir)?;
    let mut result = ScrubResult::new();

    let mut viewers = Vec::with_capacity(3);
    for axis in 0..3 {
        let config = ViewerConfig::default()
            .with_colormap(NamedColormap::Bone)
            .with_dpi(FIGURE_DPI);
        let mut viewer = Viewer::with_config(image.clone(), axis, config)?;
        for (mask, color, opacity) in masks.iter() {
            viewer.add_mask(mask, *color, *opacity)?;
        }

        let name = format!("axis{axis}.gif");
        let report = viewer.save_animation(dir.join(&name), DEFAULT_FPS)?;
        result.push(name, report);
        viewers.push(viewer);
    }

    let mid = viewers.iter().map(Viewer::extent).min().unwrap_or(1) / 2;
    let mut group = ViewerGroup::new(viewers, 1, 3)?;
    group.display(mid)?;
    result.push("group.png", group.save_figure(dir.join("group.png"), FIGURE_DPI));

    Ok(result)
}
