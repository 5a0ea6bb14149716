//! Glyph class registry.
//!
//! Classes are defined as expressions over a static glyph-name inventory and
//! materialized exactly once, before any shaping run:
//!
//! ```text
//! define("narrow", NumberInRange(^BEm(\d+)$, 1..=6))
//! define("dots_moved_plain", Difference(Class(dots_moved), Class(dots_collides)))
//!                 │
//!                 v  build(): depth-first, forward references allowed
//! ClassRegistry { "narrow" -> {BEm1, .., BEm6}, ... }
//! ```
//!
//! Definitions may refer to classes declared later. Unknown references and
//! cycles are reported as [`DefinitionError`]s.

use crate::DefinitionError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Membership expression of a glyph class.
#[derive(Debug, Clone)]
pub enum ClassExpr {
    /// Explicit glyph names. These need not be in the inventory.
    Glyphs(Vec<String>),
    /// Every inventory glyph whose name matches.
    Matching(&'static Regex),
    /// Every inventory glyph whose first capture group parses to a number in
    /// `range`.
    NumberInRange { pattern: &'static Regex, range: RangeInclusive<u32> },
    /// Another class, by name.
    Class(String),
    Union(Vec<ClassExpr>),
    Intersection(Vec<ClassExpr>),
    Difference(Box<ClassExpr>, Box<ClassExpr>),
}

impl ClassExpr {
    pub fn glyphs<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClassExpr::Glyphs(names.into_iter().map(Into::into).collect())
    }

    pub fn class(name: impl Into<String>) -> Self {
        ClassExpr::Class(name.into())
    }

    pub fn minus(self, other: ClassExpr) -> Self {
        ClassExpr::Difference(Box::new(self), Box::new(other))
    }
}

/// A materialized, ordered glyph set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphClass {
    name: String,
    members: BTreeSet<String>,
}

impl GlyphClass {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, glyph: &str) -> bool {
        self.members.contains(glyph)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

/// Collects class definitions against an inventory.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    inventory: Vec<String>,
    definitions: Vec<(String, ClassExpr)>,
}

impl RegistryBuilder {
    pub fn new<I, S>(inventory: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RegistryBuilder { inventory: inventory.into_iter().map(Into::into).collect(), definitions: Vec::new() }
    }

    /// Declare a class. Nothing is evaluated until [`RegistryBuilder::build`].
    pub fn define(&mut self, name: impl Into<String>, expr: ClassExpr) -> Result<&mut Self, DefinitionError> {
        let name = name.into();
        if self.definitions.iter().any(|(n, _)| *n == name) {
            return Err(DefinitionError::Duplicate(name));
        }
        self.definitions.push((name, expr));
        Ok(self)
    }

    /// Materialize every declared class.
    pub fn build(self) -> Result<ClassRegistry, DefinitionError> {
        let definitions: HashMap<&str, &ClassExpr> =
            self.definitions.iter().map(|(name, expr)| (name.as_str(), expr)).collect();
        let mut resolver = Resolver { inventory: &self.inventory, definitions, done: BTreeMap::new(), path: Vec::new() };

        for (name, _) in &self.definitions {
            resolver.resolve(name, name)?;
        }

        Ok(ClassRegistry { classes: resolver.done })
    }
}

struct Resolver<'a> {
    inventory: &'a [String],
    definitions: HashMap<&'a str, &'a ClassExpr>,
    done: BTreeMap<String, Arc<GlyphClass>>,
    /// Classes currently being evaluated, outermost first.
    path: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str, referenced_by: &str) -> Result<Arc<GlyphClass>, DefinitionError> {
        if let Some(class) = self.done.get(name) {
            return Ok(Arc::clone(class));
        }
        if let Some(start) = self.path.iter().position(|n| n == name) {
            let mut cycle = self.path[start..].to_vec();
            cycle.push(name.to_string());
            return Err(DefinitionError::Cycle(cycle));
        }
        let expr = *self.definitions.get(name).ok_or_else(|| DefinitionError::Unresolved {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })?;

        self.path.push(name.to_string());
        let members = self.eval(name, expr)?;
        self.path.pop();

        let class = Arc::new(GlyphClass { name: name.to_string(), members });
        self.done.insert(name.to_string(), Arc::clone(&class));
        Ok(class)
    }

    fn eval(&mut self, owner: &str, expr: &ClassExpr) -> Result<BTreeSet<String>, DefinitionError> {
        match expr {
            ClassExpr::Glyphs(names) => Ok(names.iter().cloned().collect()),
            ClassExpr::Matching(re) => Ok(self.inventory.iter().filter(|g| re.is_match(g)).cloned().collect()),
            ClassExpr::NumberInRange { pattern, range } => {
                if pattern.captures_len() < 2 {
                    return Err(DefinitionError::Malformed {
                        name: owner.to_string(),
                        reason: format!("pattern `{}` has no capture group for the number", pattern.as_str()),
                    });
                }
                Ok(self
                    .inventory
                    .iter()
                    .filter(|g| {
                        pattern
                            .captures(g)
                            .and_then(|caps| caps.get(1))
                            .and_then(|m| m.as_str().parse::<u32>().ok())
                            .is_some_and(|n| range.contains(&n))
                    })
                    .cloned()
                    .collect())
            }
            ClassExpr::Class(name) => Ok(self.resolve(name, owner)?.members.clone()),
            ClassExpr::Union(parts) => {
                let mut out = BTreeSet::new();
                for part in parts {
                    out.extend(self.eval(owner, part)?);
                }
                Ok(out)
            }
            ClassExpr::Intersection(parts) => {
                let mut iter = parts.iter();
                let first = iter.next().ok_or_else(|| DefinitionError::Malformed {
                    name: owner.to_string(),
                    reason: "intersection of no classes".to_string(),
                })?;
                let mut out = self.eval(owner, first)?;
                for part in iter {
                    let other = self.eval(owner, part)?;
                    out.retain(|g| other.contains(g));
                }
                Ok(out)
            }
            ClassExpr::Difference(lhs, rhs) => {
                let mut out = self.eval(owner, lhs)?;
                let remove = self.eval(owner, rhs)?;
                out.retain(|g| !remove.contains(g));
                Ok(out)
            }
        }
    }
}

/// Materialized classes by name. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, Arc<GlyphClass>>,
}

impl ClassRegistry {
    pub fn resolve(&self, name: &str) -> Result<&Arc<GlyphClass>, DefinitionError> {
        self.classes
            .get(name)
            .ok_or_else(|| DefinitionError::Unresolved { name: name.to_string(), referenced_by: "<lookup>".to_string() })
    }

    /// True when `glyph` belongs to class `name`; unknown classes contain nothing.
    pub fn contains(&self, name: &str, glyph: &str) -> bool {
        self.classes.get(name).is_some_and(|c| c.contains(glyph))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Vec<&'static str> {
        vec!["BEm1", "BEm2", "BEm7", "BEm12", "JIMm1", "sdb", "sdb.yb", "tdb.yb", "toeda"]
    }

    #[test]
    fn forward_references_resolve() {
        let mut builder = RegistryBuilder::new(inventory());
        builder
            .define("moved_or_toeda", ClassExpr::Union(vec![ClassExpr::class("moved"), ClassExpr::glyphs(["toeda"])]))
            .unwrap()
            .define("moved", ClassExpr::Matching(regex!(r"\.yb$")))
            .unwrap();
        let registry = builder.build().unwrap();

        let class = registry.resolve("moved_or_toeda").unwrap();
        assert_eq!(class.iter().collect::<Vec<_>>(), vec!["sdb.yb", "tdb.yb", "toeda"]);
    }

    #[test]
    fn number_threshold_selects_embedded_ids() {
        let mut builder = RegistryBuilder::new(inventory());
        builder.define("narrow", ClassExpr::NumberInRange { pattern: regex!(r"^BEm(\d+)$"), range: 1..=6 }).unwrap();
        let registry = builder.build().unwrap();

        let narrow = registry.resolve("narrow").unwrap();
        assert!(narrow.contains("BEm1"));
        assert!(narrow.contains("BEm2"));
        assert!(!narrow.contains("BEm7"));
        assert!(!narrow.contains("BEm12"));
        assert!(!narrow.contains("JIMm1"));
    }

    #[test]
    fn set_algebra() {
        let mut builder = RegistryBuilder::new(inventory());
        builder
            .define("dots", ClassExpr::Matching(regex!(r"^[sdt]db")))
            .unwrap()
            .define("moved", ClassExpr::Matching(regex!(r"\.yb$")))
            .unwrap()
            .define("plain_dots", ClassExpr::class("dots").minus(ClassExpr::class("moved")))
            .unwrap()
            .define("moved_sdb", ClassExpr::Intersection(vec![ClassExpr::class("moved"), ClassExpr::glyphs(["sdb.yb"])]))
            .unwrap();
        let registry = builder.build().unwrap();

        assert_eq!(registry.resolve("plain_dots").unwrap().iter().collect::<Vec<_>>(), vec!["sdb"]);
        assert_eq!(registry.resolve("moved_sdb").unwrap().iter().collect::<Vec<_>>(), vec!["sdb.yb"]);
    }

    #[test]
    fn unresolved_reference_fails() {
        let mut builder = RegistryBuilder::new(inventory());
        builder.define("a", ClassExpr::class("missing")).unwrap();
        let err = builder.build().unwrap_err();
        assert_eq!(err, DefinitionError::Unresolved { name: "missing".to_string(), referenced_by: "a".to_string() });
    }

    #[test]
    fn cycle_fails() {
        let mut builder = RegistryBuilder::new(inventory());
        builder
            .define("a", ClassExpr::class("b"))
            .unwrap()
            .define("b", ClassExpr::Union(vec![ClassExpr::class("a")]))
            .unwrap();
        let err = builder.build().unwrap_err();
        assert_eq!(err, DefinitionError::Cycle(vec!["a".to_string(), "b".to_string(), "a".to_string()]));
    }

    #[test]
    fn malformed_expressions_fail() {
        let mut builder = RegistryBuilder::new(inventory());
        builder.define("no_group", ClassExpr::NumberInRange { pattern: regex!(r"^BEm\d+$"), range: 1..=3 }).unwrap();
        assert!(matches!(builder.build(), Err(DefinitionError::Malformed { .. })));

        let mut builder = RegistryBuilder::new(inventory());
        builder.define("empty", ClassExpr::Intersection(Vec::new())).unwrap();
        assert!(matches!(builder.build(), Err(DefinitionError::Malformed { .. })));
    }

    #[test]
    fn duplicate_definition_fails() {
        let mut builder = RegistryBuilder::new(inventory());
        builder.define("a", ClassExpr::glyphs(["sdb"])).unwrap();
        assert_eq!(builder.define("a", ClassExpr::glyphs(["tdb"])).unwrap_err(), DefinitionError::Duplicate("a".into()));
    }
}
