//! 演示: 在合成或真实体数据上逐层浏览并导出动画.
//!
//! 体数据来自 `$RADVIS_IMAGE` (或 `$HOME/dataset/radvis/image.nii.gz`),
//! 不存在时使用合成的球形体模. 输出目录由 `$RADVIS_OUT` 指定, 默认为 `./scrub-out`.

mod phantom;
mod result;
mod runner;

use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("无法初始化日志: {e}");
    }

    match runner::run() {
        Ok(result) => {
            result.analyze();
            if result.all_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
