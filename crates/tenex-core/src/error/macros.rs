//! Error macros for tenex

/// Macro for creating invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::TenexError::invalid_value($context, $value))
    };
}

/// Macro for creating usage errors
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::TenexError::UsageError($msg.to_string()))
    };
}

/// Macro for mapping database errors
#[macro_export]
macro_rules! map_db_err {
    ($op:expr, $error:expr) => {
        $crate::error::TenexError::db_operation($op, $error)
    };
}
