//! Feature-gated status logging
//!
//! With `esp32-log` enabled every `log!` call goes to the serial console via
//! `esp-println`. Without it the arguments are still type-checked, then dropped.

#[cfg(feature = "esp32-log")]
macro_rules! log {
    ($($arg:tt)*) => {
        esp_println::println!($($arg)*)
    };
}

#[cfg(not(feature = "esp32-log"))]
macro_rules! log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}
