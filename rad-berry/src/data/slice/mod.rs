//! 体数据切片对象的操作.

mod core;
mod save;

pub use core::VolumeSlice;

pub use save::ImgWriteVis;
