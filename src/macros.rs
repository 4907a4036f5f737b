// Helpers for reading values out of the toml configuration.
// They are meant to be used in functions returning `error::Result`.

macro_rules! expect_float {
    ($value:expr, $name:expr) => {
        match $value.and_then(|v: &toml::Value| v.as_float().or_else(|| v.as_integer().map(|i| i as f64))) {
            Some(v) => v,
            None => {
                return Err($crate::error::Error::Config(format!(
                    "expected float value on key \"{}\"",
                    $name
                )))
            }
        }
    };
}

macro_rules! expect_integer {
    ($value:expr, $name:expr) => {
        match $value
            .and_then(|v: &toml::Value| v.as_integer())
            .and_then(|v| u32::try_from(v).ok())
        {
            Some(v) => v,
            None => {
                return Err($crate::error::Error::Config(format!(
                    "expected integer value in 0..={} on key \"{}\"",
                    u32::MAX,
                    $name
                )))
            }
        }
    };
}

macro_rules! expect_str {
    ($value:expr, $name:expr) => {
        match $value.and_then(|v: &toml::Value| v.as_str()) {
            Some(v) => v.to_string(),
            None => {
                return Err($crate::error::Error::Config(format!(
                    "expected string value on key \"{}\"",
                    $name
                )))
            }
        }
    };
}

macro_rules! string_or_default {
    ($value:expr, $default:expr) => {
        match $value.and_then(|v: &toml::Value| v.as_str()) {
            Some(v) => v.to_string(),
            None => $default.to_string(),
        }
    };
}
