//! 运行结果.

use rad_berry::ExportReport;
use std::io::{self, Write};

/// 将 `report` 写进 `w` 中.
fn describe_into<W: Write>(name: &str, r: &ExportReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Export `{name}`:")?;
    writeln!(w, "{S4}Path: {}", r.path.display())?;
    writeln!(w, "{S4}Frames: {}", r.frames)?;
    writeln!(w, "{S4}Interval: {} ms", r.interval.as_millis())?;
    match &r.error {
        Some(e) => write!(w, "{S4}Failed: {e}")?,
        None => write!(w, "{S4}Ok")?,
    }
    Ok(())
}

/// 全部导出的结果.
pub struct ScrubResult {
    data: Vec<(String, ExportReport)>,
}

impl ScrubResult {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn push(&mut self, name: impl Into<String>, report: ExportReport) {
        self.data.push((name.into(), report));
    }

    /// 是否全部导出成功?
    pub fn all_ok(&self) -> bool {
        self.data.iter().all(|(_, r)| r.is_ok())
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = utils::sep_to(&mut out);
        for (name, report) in self.data.iter() {
            if describe_into(name, report, &mut out).and_then(|_| writeln!(out)).is_err() {
                return;
            }
            let _ = utils::sep_to(&mut out);
        }
    }
}
