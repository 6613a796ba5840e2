//! 工具模块
//!
//! 提供注册表共用的错误类型。

pub mod error;

pub use error::{RegistryError, Result};
