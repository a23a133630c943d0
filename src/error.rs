//! # 统一错误处理模块
//!
//! 定义 kikuchi 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// kikuchi 统一错误类型
#[derive(Error, Debug)]
pub enum KikuchiError {
    // ─────────────────────────────────────────────────────────────
    // 配置错误（构造时立即返回）
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Unknown element '{0}': no scattering factor available")]
    UnknownElement(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误（仅命令行前端使用）
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write image '{path}': {reason}")]
    ImageError { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl KikuchiError {
    /// 构造配置错误
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        KikuchiError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, KikuchiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = KikuchiError::config("binning", "must be >= 1, got 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'binning': must be >= 1, got 0"
        );
    }
}
