//! 组件注册表错误类型定义
//!
//! 本模块定义了注册表中使用的所有错误类型。
//! 每条失败路径都会带上引发问题的组件类型名，错误不会被静默丢弃。

use thiserror::Error;

use crate::component::ComponentError;

/// 组件注册表核心错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    // ==================== 配置错误 ====================

    /// 组件已激活，重复初始化属于调用方错误
    #[error("组件 '{0}' 已处于激活状态")]
    AlreadyActive(&'static str),

    /// 组件正处于初始化过程中，说明依赖形成了环
    #[error("组件 '{0}' 正在等待初始化（循环依赖？）")]
    PendingInitialization(&'static str),

    /// 组件正处于卸载过程中，说明卸载路径形成了环
    #[error("组件 '{0}' 正在等待卸载（循环依赖？）")]
    PendingDeinitialization(&'static str),

    /// 组件声明中没有任何可用的构造路径
    #[error("组件 '{0}' 没有可用的构造路径")]
    NoConstructor(&'static str),

    /// 组件未注册
    #[error("组件 '{0}' 未注册")]
    NotRegistered(&'static str),

    /// 组件未激活（查找失败）
    #[error("组件 '{0}' 尚未初始化")]
    NotActive(&'static str),

    // ==================== 初始化错误 ====================

    /// 构造路径或初始化钩子失败
    #[error("组件 '{component}' 构造失败")]
    ConstructionFailed {
        /// 引发失败的组件类型名
        component: &'static str,
        /// 底层原因
        #[source]
        source: ComponentError,
    },

    // ==================== 卸载错误 ====================

    /// 卸载钩子失败
    #[error("组件 '{component}' 卸载失败")]
    UnloadFailed {
        /// 引发失败的组件类型名
        component: &'static str,
        /// 底层原因
        #[source]
        source: ComponentError,
    },

    /// 组件仍被其他激活组件依赖，单独卸载被拒绝
    #[error("组件 '{component}' 无法卸载：仍存在激活的依赖者 {dependents:?}")]
    DependentsStillActive {
        /// 被依赖的组件类型名
        component: &'static str,
        /// 仍处于激活状态的依赖者
        dependents: Vec<&'static str>,
    },

    /// 批量卸载时发现依赖者不在本次批次中，操作在改动任何状态前中止
    #[error("组件 '{component}' 无法卸载：依赖者 '{dependent}' 不在本次卸载批次中")]
    DependentOutsideBatch {
        /// 被依赖的组件类型名
        component: &'static str,
        /// 批次之外的依赖者
        dependent: &'static str,
    },

    // ==================== 绑定状态错误 ====================

    /// 注册表已绑定宿主上下文
    #[error("注册表已绑定宿主上下文，无法重复执行批量初始化")]
    AlreadyBound,

    /// 注册表尚未绑定宿主上下文
    #[error("注册表尚未绑定宿主上下文")]
    NotBound,

    /// 卸载句柄属于更早的一次批量初始化，或属于另一个注册表实例
    #[error("卸载句柄与该注册表不匹配或已过期")]
    StaleTeardownHandle,
}

/// 注册表操作的统一结果类型
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_component() {
        let err = RegistryError::NoConstructor("demo::Config");
        assert!(err.to_string().contains("demo::Config"));

        let err = RegistryError::DependentsStillActive {
            component: "demo::Config",
            dependents: vec!["demo::Commands"],
        };
        let message = err.to_string();
        assert!(message.contains("demo::Config"));
        assert!(message.contains("demo::Commands"));
    }

    #[test]
    fn test_wrapped_error_keeps_source() {
        let source: ComponentError = "磁盘已满".into();
        let err = RegistryError::ConstructionFailed {
            component: "demo::Storage",
            source,
        };

        let source = std::error::Error::source(&err).expect("应保留底层原因");
        assert_eq!(source.to_string(), "磁盘已满");
    }
}
