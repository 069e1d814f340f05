//! 运行时错误.
//!
//! 结构性错误 (形状, 维数, 越界, 网格) 总在引入它们的调用处立即返回.
//! 导出阶段的编码错误 [`ExportError`] 则不会向上传播, 而是记录在
//! [`crate::viewer::ExportReport`] 中.

use std::path::PathBuf;
use thiserror::Error;

/// 切片浏览、掩膜注册与视图分组的运行时错误.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliceError {
    /// 掩膜形状与体数据形状不一致.
    #[error("掩膜形状 {found:?} 与体数据形状 {expected:?} 不符")]
    ShapeMismatch {
        /// 体数据形状.
        expected: Vec<usize>,
        /// 实际传入的形状.
        found: Vec<usize>,
    },

    /// 参数格式错误 (如非法的不透明度, 无法转换为浮点数的掩膜值).
    #[error("非法输入: {0}")]
    InvalidInput(String),

    /// 既不是已知色图, 也无法解析为颜色的规格.
    #[error("非法颜色规格: `{0}`")]
    InvalidColorSpec(String),

    /// 切片索引不在 `[0, extent)` 内.
    #[error("索引 {index} 越界: 轴 {axis} 的长度为 {extent}")]
    IndexOutOfBounds {
        /// 请求的索引. 来自宿主滑块的输入可能为负.
        index: i64,
        /// 所在轴.
        axis: usize,
        /// 轴长度.
        extent: usize,
    },

    /// 轴编号不在 `[0, rank)` 内.
    #[error("轴 {axis} 越界: 体数据维数为 {rank}")]
    AxisOutOfBounds {
        /// 请求的轴.
        axis: usize,
        /// 体数据维数.
        rank: usize,
    },

    /// 该操作只支持三维体数据. 参数为实际维数.
    #[error("只支持三维体数据, 但实际维数为 {0}")]
    UnsupportedRank(usize),

    /// `rows * cols` 与成员个数不符.
    #[error("浏览器个数 ({count}) 与网格 {rows}x{cols} 不符")]
    GridMismatch {
        /// 行数.
        rows: usize,
        /// 列数.
        cols: usize,
        /// 成员个数.
        count: usize,
    },
}

/// 切片浏览运行时结果.
pub type SliceResult<T> = Result<T, SliceError>;

/// 动画或静态帧编码错误. 只作为诊断信息返回, 不会终止浏览会话.
#[derive(Debug, Error)]
pub enum ExportError {
    /// 底层 I/O 错误 (如路径不可写).
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 图像编码器错误.
    #[error("图像编码错误: {0}")]
    Image(#[from] image::ImageError),

    /// 不支持的动画容器格式 (目前只支持 gif).
    #[error("不支持的动画格式: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// 没有可编码的帧.
    #[error("没有可编码的帧")]
    NoFrames,
}

/// 体数据加载/保存错误. 只在核心之外的加载层使用.
#[derive(Debug, Error)]
pub enum LoadError {
    /// nifti 文件读取错误.
    #[error("nifti 读取错误: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// npy 文件读取错误.
    #[error("npy 读取错误: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// npy 文件写入错误.
    #[error("npy 写入错误: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// 无法从扩展名推断格式, 或格式不受支持.
    #[error("不支持的文件格式: {0:?}")]
    UnsupportedFormat(PathBuf),
}
