//! Hook references
//!
//! A hook is named by `"<dotted.module.path>.<function>"`; the last dot
//! separates the module from the function. `"<module>:<function>"` is
//! accepted as well. Lists of references are passed on the command line
//! joined by `|`.

use std::fmt;
use velcro_core::{Error, Result};

/// Separator of call-time hook lists
pub const LIST_SEPARATOR: char = '|';

/// A parsed hook reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookReference {
    module: String,
    function: String,
}

impl HookReference {
    /// Parse a reference string
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let split = reference
            .rsplit_once(':')
            .or_else(|| reference.rsplit_once('.'));

        match split {
            Some((module, function))
                if !module.is_empty()
                    && !function.is_empty()
                    && !module.contains(':')
                    && !function.contains('.') =>
            {
                Ok(Self {
                    module: module.to_string(),
                    function: function.to_string(),
                })
            }
            _ => Err(Error::HookResolution {
                reference: reference.to_string(),
                reason: "expected <module>.<function>".to_string(),
            }),
        }
    }

    /// Dotted module path
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Function name within the module
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl fmt::Display for HookReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

/// Split a call-time hook list into references
///
/// Empty segments are dropped, so `"a.f||b.g|"` yields two references.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let r = HookReference::parse("velcro.utils.cdn_timestamp").unwrap();
        assert_eq!(r.module(), "velcro.utils");
        assert_eq!(r.function(), "cdn_timestamp");
        assert_eq!(r.to_string(), "velcro.utils.cdn_timestamp");
    }

    #[test]
    fn test_parse_colon() {
        let r = HookReference::parse("pkg.a:f").unwrap();
        assert_eq!(r.module(), "pkg.a");
        assert_eq!(r.function(), "f");
        assert_eq!(r, HookReference::parse("pkg.a.f").unwrap());
    }

    #[test]
    fn test_parse_single_segment_module() {
        let r = HookReference::parse("deploy.restart").unwrap();
        assert_eq!(r.module(), "deploy");
        assert_eq!(r.function(), "restart");
    }

    #[test]
    fn test_parse_rejects_bare_name() {
        let err = HookReference::parse("restart").unwrap_err();
        assert!(matches!(err, Error::HookResolution { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(HookReference::parse("pkg.").is_err());
        assert!(HookReference::parse(".f").is_err());
        assert!(HookReference::parse("pkg:").is_err());
        assert!(HookReference::parse("a:b:c").is_err());
        assert!(HookReference::parse("a:b.c").is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("a.f|b.g"),
            vec!["a.f".to_string(), "b.g".to_string()]
        );
        assert_eq!(split_list("a.f||b.g|"), vec!["a.f", "b.g"]);
        assert!(split_list("").is_empty());
        assert_eq!(split_list(" a.f "), vec!["a.f"]);
    }
}
