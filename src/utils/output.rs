//! # 终端输出
//!
//! 子命令的状态行、参数列表与结果汇总。库代码只通过 `log` 记录，从不直接打印；
//! 终端上的用户输出全部经过这里。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `batch/` 的 BatchResult 打印批量汇总
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};
use std::path::Path;

use crate::batch::BatchResult;

/// 标题与分隔线宽度
const RULE_WIDTH: usize = 60;

/// 批量汇总中最多列出的失败条目
const MAX_LISTED_FAILURES: usize = 10;

/// 状态行类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Skip,
    Done,
}

impl Status {
    fn tag(self) -> ColoredString {
        match self {
            Status::Success => "[OK]".green().bold(),
            Status::Error => "[ERR]".red().bold(),
            Status::Warning => "[WARN]".yellow().bold(),
            Status::Info => "[*]".blue().bold(),
            Status::Skip => "[SKIP]".dimmed(),
            Status::Done => "[DONE]".green().bold(),
        }
    }
}

/// 格式化一行状态
pub fn status_line(status: Status, msg: &str) -> String {
    format!("{} {}", status.tag(), msg)
}

/// 打印状态行；错误写到 stderr
pub fn print_status(status: Status, msg: &str) {
    match status {
        Status::Error => eprintln!("{}", status_line(status, msg)),
        _ => println!("{}", status_line(status, msg)),
    }
}

pub fn print_success(msg: &str) {
    print_status(Status::Success, msg);
}

pub fn print_error(msg: &str) {
    print_status(Status::Error, msg);
}

pub fn print_warning(msg: &str) {
    print_status(Status::Warning, msg);
}

pub fn print_info(msg: &str) {
    print_status(Status::Info, msg);
}

pub fn print_skip(msg: &str) {
    print_status(Status::Skip, msg);
}

pub fn print_done(msg: &str) {
    print_status(Status::Done, msg);
}

/// 打印一行参数（名称对齐）
pub fn print_param(name: &str, value: &str) {
    println!("    {:<20} {}", name.dimmed(), value);
}

/// 写出一张图像后的确认行
pub fn print_image_written(kind: &str, width: usize, height: usize, path: &Path) {
    print_success(&format!(
        "{} {}x{} written to '{}'",
        kind,
        width,
        height,
        path.display()
    ));
}

/// 灰度直方图摘要：最暗、最亮与中位灰度
pub fn gray_summary(pixels: &[u8]) -> Option<String> {
    let mut histogram = [0usize; 256];
    for &p in pixels {
        histogram[p as usize] += 1;
    }
    let min = histogram.iter().position(|&n| n > 0)?;
    let max = histogram.iter().rposition(|&n| n > 0)?;

    let half = pixels.len().div_ceil(2);
    let mut seen = 0;
    let median = histogram
        .iter()
        .position(|&n| {
            seen += n;
            seen >= half
        })
        .unwrap_or(max);

    Some(format!("gray {}..{}, median {}", min, max, median))
}

/// 批量模式的汇总与失败列表
pub fn print_batch_summary(unit: &str, result: &BatchResult) {
    print_separator();
    print_done(&format!(
        "Batch complete: {} {}, {} success, {} skipped, {} failed",
        result.total(),
        unit,
        result.success,
        result.skipped,
        result.failed
    ));

    if result.failures.is_empty() {
        return;
    }
    print_warning(&format!("Failed {}:", unit));
    for (id, err) in result.failures.iter().take(MAX_LISTED_FAILURES) {
        print_error(&format!("  {}: {}", id, err));
    }
    if result.failures.len() > MAX_LISTED_FAILURES {
        print_warning(&format!(
            "  ... and {} more",
            result.failures.len() - MAX_LISTED_FAILURES
        ));
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(RULE_WIDTH);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_carries_tag_and_message() {
        let line = status_line(Status::Warning, "No orientations found");
        assert!(line.contains("[WARN]"));
        assert!(line.ends_with("No orientations found"));
        assert!(status_line(Status::Skip, "x").contains("[SKIP]"));
    }

    #[test]
    fn test_gray_summary() {
        assert_eq!(
            gray_summary(&[0, 128, 128, 255]).as_deref(),
            Some("gray 0..255, median 128")
        );
        assert_eq!(gray_summary(&[7]).as_deref(), Some("gray 7..7, median 7"));
        assert_eq!(gray_summary(&[]), None);
    }
}
