// src/macros.rs

/// Log through `tracing` at the given level, e.g. `app_log!(info, "Loaded {}", n)`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}
