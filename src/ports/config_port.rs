//! Configuration access port trait.
//!
//! Sections and keys follow the scan configuration file: `[data]`, `[log]`,
//! `[scan]` and one `[strategy.<id>]` section per strategy.

pub trait ConfigPort {
    /// Raw value, `None` when the section or key is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Integer value, or `default` when absent or not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Accepts `true`/`yes`/`1` and `false`/`no`/`0`; anything else is `default`.
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
