//! Coloured console helpers. They write to stderr so that answers on stdout
//! stay machine readable.

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

pub fn paint(colour: &str, message: &str) -> String {
    format!("{colour}{message}{RESET}")
}

#[macro_export]
macro_rules! print_red {
    ($($arg:tt)*) => {
        eprintln!("{}", $crate::common::logging::paint($crate::common::logging::RED, &format!($($arg)*)));
    };
}

#[macro_export]
macro_rules! print_green {
    ($($arg:tt)*) => {
        eprintln!("{}", $crate::common::logging::paint($crate::common::logging::GREEN, &format!($($arg)*)));
    };
}

#[macro_export]
macro_rules! print_yellow {
    ($($arg:tt)*) => {
        eprintln!("{}", $crate::common::logging::paint($crate::common::logging::YELLOW, &format!($($arg)*)));
    };
}

#[macro_export]
macro_rules! print_blue {
    ($($arg:tt)*) => {
        eprintln!("{}", $crate::common::logging::paint($crate::common::logging::BLUE, &format!($($arg)*)));
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_and_resets() {
        assert_eq!(paint(GREEN, "ok"), "\x1b[32mok\x1b[0m");
    }
}
