//! Call-site capture for log lines
//!
//! Facade methods are `#[track_caller]`, so `Location::caller()` inside them
//! points at the user's logging statement. A [`CallSiteResolver`] turns that
//! location into the `file:line` pair printed on the line.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Source location printed as `<file>:<line>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: Cow<'static, str>,
    pub line: u32,
}

impl CallSite {
    /// Explicit location, for callers that cannot go through `#[track_caller]`.
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

pub trait CallSiteResolver: Send + Sync {
    fn resolve(&self, location: &'static Location<'static>) -> CallSite;
}

/// Prints only the file name, `src/server/main.rs` becomes `main.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasenameResolver;

impl CallSiteResolver for BasenameResolver {
    fn resolve(&self, location: &'static Location<'static>) -> CallSite {
        let file = location.file();
        let base = Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file);
        CallSite::new(base, location.line())
    }
}

/// Prints the path as the compiler recorded it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPathResolver;

impl CallSiteResolver for FullPathResolver {
    fn resolve(&self, location: &'static Location<'static>) -> CallSite {
        CallSite::new(location.file(), location.line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn here() -> &'static Location<'static> {
        Location::caller()
    }

    #[test]
    fn test_basename_resolver() {
        let location = here();
        let site = BasenameResolver.resolve(location);
        assert_eq!(site.file, "call_site.rs");
        assert_eq!(site.line, location.line());
    }

    #[test]
    fn test_full_path_resolver_keeps_directories() {
        let site = FullPathResolver.resolve(here());
        assert!(site.file.ends_with("call_site.rs"));
        assert!(site.file.len() > "call_site.rs".len());
    }

    #[test]
    fn test_display() {
        let site = CallSite::new(String::from("worker.rs"), 42);
        assert_eq!(site.to_string(), "worker.rs:42");
    }
}
