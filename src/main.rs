//! # kikuchi 命令行前端
//!
//! 库本身不做文件 I/O；图像与 CSV 的读写全部在这里完成。
//!
//! ## 子命令
//! - `simulate`   - 模拟 Kikuchi 花样（单个或批量）
//! - `mask`       - 生成圆盘遮罩图像
//! - `reflectors` - 列出衍射晶面族
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/   (并行批处理)
//!   │     └── export/  (图像与 CSV 写出)
//!   ├── utils/      (输出与进度条)
//!   └── kikuchi     (模拟库)
//! ```

mod batch;
mod cli;
mod commands;
mod export;
mod utils;

use clap::Parser;
use cli::Cli;
use env_logger::Env;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
