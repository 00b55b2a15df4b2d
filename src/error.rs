use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl DockError {
    pub fn service_unavailable<T>(msg: impl Into<String>) -> Result<T> {
        Err(DockError::ServiceUnavailable(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, DockError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! dock_error {
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::DockError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::DockError::Internal(format!($($arg)*))
    };
}
