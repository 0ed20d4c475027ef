//! Absolute group paths.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Absolute path of a group, e.g. `/fields/rho/discretefields/rho`.
///
/// The root group is `/`. Components are non-empty, contain no `/`, and are
/// neither `.` nor `..`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupPath {
    components: Vec<String>,
}

impl GroupPath {
    /// The root group.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether `name` can be used as a single path component.
    pub fn is_valid_component(name: &str) -> bool {
        !name.is_empty() && name != "." && name != ".." && !name.contains('/')
    }

    /// Path of the child group `name`.
    ///
    /// The component is not validated here; backends reject invalid
    /// components when the group is created.
    pub fn child(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        components.push(name.to_string());
        Self { components }
    }

    /// Path of the enclosing group, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.components.split_last()?;
        Some(Self {
            components: head.to_vec(),
        })
    }

    /// Final component, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// All components from the root down.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Whether this is the root group.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromStr for GroupPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidPath {
            path: s.to_string(),
        };
        let rest = s.strip_prefix('/').ok_or_else(invalid)?;
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let components: Vec<String> = rest.split('/').map(str::to_string).collect();
        if !components.iter().all(|c| Self::is_valid_component(c)) {
            return Err(invalid());
        }
        Ok(Self { components })
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for c in &self.components {
            write!(f, "/{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_slash() {
        assert_eq!(GroupPath::root().to_string(), "/");
        assert_eq!("/".parse::<GroupPath>().unwrap(), GroupPath::root());
    }

    #[test]
    fn parse_and_display_round_trip() {
        let p: GroupPath = "/manifolds/domain/discretizations/uniform".parse().unwrap();
        assert_eq!(p.components().len(), 4);
        assert_eq!(p.name(), Some("uniform"));
        assert_eq!(p.to_string(), "/manifolds/domain/discretizations/uniform");
    }

    #[test]
    fn child_and_parent_are_inverse() {
        let p = GroupPath::root().child("fields").child("rho");
        assert_eq!(p.parent().unwrap(), GroupPath::root().child("fields"));
        assert!(GroupPath::root().parent().is_none());
    }

    #[test]
    fn relative_and_dotted_paths_are_rejected() {
        assert!("fields/rho".parse::<GroupPath>().is_err());
        assert!("/fields//rho".parse::<GroupPath>().is_err());
        assert!("/fields/../rho".parse::<GroupPath>().is_err());
        assert!("/fields/".parse::<GroupPath>().is_err());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn valid_components_survive_display_and_parse(
            names in prop::collection::vec("[a-zA-Z0-9_.-]{1,8}", 0..6)
                .prop_filter("dot components", |v| v.iter().all(|n| n != "." && n != "..")),
        ) {
            let path = names.iter().fold(GroupPath::root(), |p, n| p.child(n));
            let back: GroupPath = path.to_string().parse().unwrap();
            prop_assert_eq!(back.components(), names.as_slice());
            prop_assert_eq!(back, path);
        }
    }
}
