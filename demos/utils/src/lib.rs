//! 演示程序依赖的通用组件.

use rad_berry::Volume;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 向 `w` 写入简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 打印体数据的基本信息.
pub fn describe(name: &str, volume: &Volume) {
    let w = volume.window();
    log::info!(
        "`{name}`: shape = {:?}, 强度范围 = [{}, {}] (窗位 {}, 窗宽 {})",
        volume.shape(),
        w.lower_bound(),
        w.upper_bound(),
        w.level(),
        w.width()
    );
}
