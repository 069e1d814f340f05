//! 体数据文件的加载与保存. 核心浏览器从不直接解析文件格式, 只消费这里产生的 [`Volume`].

use ndarray::ArrayD;
use ndarray_npy::{read_npy, write_npy, ReadNpyError};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::Volume;

/// 可识别的体数据文件格式.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VolumeFormat {
    /// `.nii` / `.nii.gz`.
    Nifti,
    /// `.npy`.
    Npy,
    /// `.dcm`. 可识别但不支持读取.
    Dicom,
}

impl VolumeFormat {
    /// 由文件扩展名推断格式 (不区分大小写).
    pub fn from_path(path: &Path) -> Option<VolumeFormat> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".nii") || name.ends_with(".nii.gz") {
            Some(Self::Nifti)
        } else if name.ends_with(".npy") {
            Some(Self::Npy)
        } else if name.ends_with(".dcm") {
            Some(Self::Dicom)
        } else {
            None
        }
    }
}

/// 按扩展名加载体数据.
///
/// nifti 文件保持其存储的轴顺序; npy 文件依次尝试 `f32`, `f64`, `i16`, `u8` 元素类型.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Volume, LoadError> {
    let path = path.as_ref();
    let volume = match VolumeFormat::from_path(path) {
        Some(VolumeFormat::Nifti) => {
            let obj = ReaderOptions::new().read_file(path)?;
            Volume::new(obj.into_volume().into_ndarray::<f32>()?)
        }
        Some(VolumeFormat::Npy) => Volume::new(read_npy_any(path)?),
        Some(VolumeFormat::Dicom) | None => {
            return Err(LoadError::UnsupportedFormat(path.to_path_buf()))
        }
    };
    log::info!("加载 {path:?}: {:?}", volume.shape());
    Ok(volume)
}

fn read_npy_any(path: &Path) -> Result<ArrayD<f32>, ReadNpyError> {
    match read_npy::<_, ArrayD<f32>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other,
    }
    match read_npy::<_, ArrayD<f64>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other.map(|a| a.mapv(|v| v as f32)),
    }
    match read_npy::<_, ArrayD<i16>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other.map(|a| a.mapv(f32::from)),
    }
    read_npy::<_, ArrayD<u8>>(path).map(|a| a.mapv(f32::from))
}

/// 以 `f32` npy 格式保存体数据.
pub fn save_npy<P: AsRef<Path>>(path: P, volume: &Volume) -> Result<(), LoadError> {
    write_npy(path, &volume.data())?;
    Ok(())
}

/// 创建位于 `$HOME/dataset/<it>` 的路径.
///
/// 如果无法获取用户主目录, 则返回 `None`.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}
