//! Classpath assembly for the engine environment

/// Separator between classpath entries on this platform
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: &str = ":";

/// Join classpath entries with the platform path-list separator
///
/// `additional` is a raw, already separator-joined fragment appended
/// verbatim. Empty inputs produce an empty string with no dangling
/// separators.
pub fn build_classpath(elements: &[String], additional: Option<&str>) -> String {
    let mut classpath = elements.join(PATH_LIST_SEPARATOR);

    if let Some(additional) = additional.filter(|s| !s.is_empty()) {
        if !classpath.is_empty() {
            classpath.push_str(PATH_LIST_SEPARATOR);
        }
        classpath.push_str(additional);
    }

    classpath
}
