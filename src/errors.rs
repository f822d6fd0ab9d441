//! 批改控制台的错误类型
//!
//! 每个变体带一个稳定的错误代码和一个归类，HTTP 层按归类决定状态码。

use std::fmt;

use actix_web::http::StatusCode;

/// 错误归类，决定对外暴露的 HTTP 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 请求本身不合法
    Invalid,
    /// 目标资源不存在
    Missing,
    /// 与并发写入冲突
    Stale,
    /// 后端故障
    Internal,
}

impl ErrorClass {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorClass::Invalid => StatusCode::BAD_REQUEST,
            ErrorClass::Missing => StatusCode::NOT_FOUND,
            ErrorClass::Stale => StatusCode::CONFLICT,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

macro_rules! define_grading_errors {
    ($(
        $variant:ident => $code:literal, $label:literal, $class:ident
    );* $(;)?) => {
        #[derive(Debug, Clone)]
        pub enum GradingError {
            $($variant(String),)*
        }

        impl GradingError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradingError::$variant(_) => $code,)*
                }
            }

            /// 人类可读的错误类别名
            pub fn label(&self) -> &'static str {
                match self {
                    $(GradingError::$variant(_) => $label,)*
                }
            }

            pub fn class(&self) -> ErrorClass {
                match self {
                    $(GradingError::$variant(_) => ErrorClass::$class,)*
                }
            }

            pub fn message(&self) -> &str {
                match self {
                    $(GradingError::$variant(detail) => detail,)*
                }
            }
        }

        paste::paste! {
            impl GradingError {
                $(
                    pub fn [<$variant:snake>](detail: impl Into<String>) -> Self {
                        GradingError::$variant(detail.into())
                    }
                )*
            }
        }
    };
}

define_grading_errors! {
    CacheConnection    => "E001", "Cache Connection Error", Internal;
    CachePluginNotFound => "E002", "Cache Plugin Not Found", Internal;
    DatabaseConfig     => "E003", "Database Configuration Error", Internal;
    DatabaseConnection => "E004", "Database Connection Error", Internal;
    DatabaseOperation  => "E005", "Database Operation Error", Internal;
    FileOperation      => "E006", "File Operation Error", Internal;
    Validation         => "E007", "Validation Error", Invalid;
    NotFound           => "E008", "Resource Not Found", Missing;
    Serialization      => "E009", "Serialization Error", Internal;
    DateParse          => "E011", "Date Parse Error", Invalid;
    Grader             => "E012", "Grader Error", Internal;
    Conflict           => "E013", "Concurrent Modification", Stale;
}

impl fmt::Display for GradingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code(), self.label(), self.message())
    }
}

impl std::error::Error for GradingError {}

impl From<sea_orm::DbErr> for GradingError {
    fn from(err: sea_orm::DbErr) -> Self {
        GradingError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for GradingError {
    fn from(err: std::io::Error) -> Self {
        GradingError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GradingError {
    fn from(err: serde_json::Error) -> Self {
        GradingError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GradingError {
    fn from(err: chrono::ParseError) -> Self {
        GradingError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradingError>;
