//! 对 `rad_berry::io` 的更一层封装. 提供更直接的体数据加载器.

use rad_berry::io::{home_dataset_dir_with, load_image};
use rad_berry::{LoadError, Volume};
use std::env;
use std::path::PathBuf;

/// 获取演示用体数据路径.
///
/// 1. 若环境变量 `$RADVIS_IMAGE` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/radvis/image.nii.gz` (若无法获取主目录则为 `None`).
pub fn image_path_from_env_or_home() -> Option<PathBuf> {
    match env::var("RADVIS_IMAGE") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["radvis", "image.nii.gz"]),
    }
}

/// 获取演示用掩膜路径.
///
/// 1. 若环境变量 `$RADVIS_MASK` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/radvis/mask.nii.gz`.
pub fn mask_path_from_env_or_home() -> Option<PathBuf> {
    match env::var("RADVIS_MASK") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["radvis", "mask.nii.gz"]),
    }
}

/// 从 `$RADVIS_IMAGE` 或者 `$HOME/dataset/radvis` 下加载体数据.
///
/// 路径不存在时返回 `None`; 文件存在但无法解析时返回错误.
pub fn image_from_env_or_home() -> Option<Result<Volume, LoadError>> {
    let p = image_path_from_env_or_home().filter(|p| p.is_file())?;
    Some(load_image(p))
}

/// 从 `$RADVIS_MASK` 或者 `$HOME/dataset/radvis` 下加载掩膜.
pub fn mask_from_env_or_home() -> Option<Result<Volume, LoadError>> {
    let p = mask_path_from_env_or_home().filter(|p| p.is_file())?;
    Some(load_image(p))
}
