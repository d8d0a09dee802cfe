//! Role classification and the compatibility policy.
//!
//! Which axis combinations an artifact expands into is a business decision,
//! not something derivable from the files: a linter is written once per
//! language, a backend engineer once per language/framework pairing that
//! actually exists, and a general-purpose agent once per combination of every
//! axis it mentions. The mapping is encoded here as two closed enums and a
//! pure function.
//!
//! Role precedence follows declaration order of [`Role`]. An artifact named
//! `backend-linter` classifies as [`Role::Linting`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::SyncConfig;

/// Role of an artifact, derived from keywords in its file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// `lint`, `linter`, `linting`
    Linting,
    /// `test`, `tester`, `testing`
    Testing,
    /// `frontend`
    Frontend,
    /// `backend`
    Backend,
    /// No keyword matched.
    General,
}

impl Role {
    /// Every role in precedence order.
    pub const ALL: [Self; 5] = [Self::Linting, Self::Testing, Self::Frontend, Self::Backend, Self::General];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Linting => &["linting", "linter", "lint"],
            Self::Testing => &["testing", "tester", "test"],
            Self::Frontend => &["frontend"],
            Self::Backend => &["backend"],
            Self::General => &[],
        }
    }

    /// Classify a file stem.
    ///
    /// Keywords are compared against whole `-`/`_` separated segments, so
    /// `contest-judge` is not a tester.
    pub fn classify(stem: &str) -> Self {
        let segments: Vec<String> = stem
            .split(['-', '_'])
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        Self::ALL
            .into_iter()
            .find(|role| role.keywords().iter().any(|kw| segments.iter().any(|s| s == kw)))
            .unwrap_or(Self::General)
    }

    /// Strategy used when the configuration does not override the role.
    pub fn default_strategy(self) -> ExpansionStrategy {
        match self {
            Self::Linting | Self::Testing => ExpansionStrategy::PrimaryOnly,
            Self::Frontend | Self::Backend => ExpansionStrategy::Paired,
            Self::General => ExpansionStrategy::CrossProduct,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linting => "linting",
            Self::Testing => "testing",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::General => "general",
        };
        f.write_str(name)
    }
}

/// How an artifact's usable axes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpansionStrategy {
    /// Full cross product of every usable axis.
    CrossProduct,
    /// Only the primary axis; secondary axes are ignored.
    PrimaryOnly,
    /// Primary axis paired with the secondary values the compatibility map
    /// allows for each primary value.
    Paired,
}

/// One selection of a value per axis, keyed by axis name.
pub type Combination = BTreeMap<String, String>;

/// Pure mapping from (role, usable axis values) to allowed combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityPolicy {
    primary_axis: String,
    overrides: BTreeMap<Role, ExpansionStrategy>,
    compatibility: BTreeMap<String, Vec<String>>,
}

impl CompatibilityPolicy {
    /// Build a policy from its parts.
    pub fn new(
        primary_axis: impl Into<String>,
        overrides: BTreeMap<Role, ExpansionStrategy>,
        compatibility: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            primary_axis: primary_axis.into(),
            overrides,
            compatibility,
        }
    }

    /// Build the policy described by a configuration.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.primary_axis.clone(), config.roles.clone(), config.compatibility.clone())
    }

    /// Name of the primary axis.
    pub fn primary_axis(&self) -> &str {
        &self.primary_axis
    }

    /// Strategy applied to `role`.
    pub fn strategy_for(&self, role: Role) -> ExpansionStrategy {
        self.overrides.get(&role).copied().unwrap_or_else(|| role.default_strategy())
    }

    /// Allowed combinations for an artifact of `role`.
    ///
    /// `axes` holds only the usable axes the artifact references, each with
    /// its sorted, non-empty value list. The result is sorted and may be
    /// empty; callers fall back to a base entry in that case.
    pub fn combinations(&self, role: Role, axes: &BTreeMap<String, Vec<String>>) -> Vec<Combination> {
        let strategy = self.strategy_for(role);
        tracing::trace!("Expanding {role} artifact with {strategy:?} over {} axes", axes.len());

        match strategy {
            ExpansionStrategy::CrossProduct => cross_product(axes.iter()),
            ExpansionStrategy::PrimaryOnly => match axes.get(&self.primary_axis) {
                Some(values) => values.iter().map(|value| self.primary_only(value)).collect(),
                None => Vec::new(),
            },
            ExpansionStrategy::Paired => self.paired(axes),
        }
    }

    fn primary_only(&self, value: &str) -> Combination {
        Combination::from([(self.primary_axis.clone(), value.to_string())])
    }

    fn paired(&self, axes: &BTreeMap<String, Vec<String>>) -> Vec<Combination> {
        let Some(primary_values) = axes.get(&self.primary_axis) else {
            return Vec::new();
        };

        let mut combinations = Vec::new();
        for primary in primary_values {
            // Absent from the map: pairs with everything. Present: only the
            // listed values survive; secondary axes left empty are dropped.
            let allowed = self.compatibility.get(primary);
            let secondary: Vec<(&String, Vec<String>)> = axes
                .iter()
                .filter(|(name, _)| **name != self.primary_axis)
                .map(|(name, values)| {
                    let kept = values
                        .iter()
                        .filter(|value| allowed.is_none_or(|list| list.contains(*value)))
                        .cloned()
                        .collect::<Vec<_>>();
                    (name, kept)
                })
                .filter(|(_, kept)| !kept.is_empty())
                .collect();

            if secondary.is_empty() {
                combinations.push(self.primary_only(primary));
                continue;
            }

            for mut combination in cross_product(secondary.iter().map(|(name, values)| (*name, values))) {
                combination.insert(self.primary_axis.clone(), primary.clone());
                combinations.push(combination);
            }
        }

        combinations.sort();
        combinations
    }
}

fn cross_product<'a>(axes: impl Iterator<Item = (&'a String, &'a Vec<String>)>) -> Vec<Combination> {
    let mut combinations = vec![Combination::new()];
    for (name, values) in axes {
        combinations = combinations
            .into_iter()
            .flat_map(|partial| {
                values.iter().map(move |value| {
                    let mut next = partial.clone();
                    next.insert(name.clone(), value.clone());
                    next
                })
            })
            .collect();
    }
    combinations.retain(|c| !c.is_empty());
    combinations.sort();
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.iter().map(ToString::to_string).collect()))
            .collect()
    }

    fn combo(entries: &[(&str, &str)]) -> Combination {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn default_policy() -> CompatibilityPolicy {
        CompatibilityPolicy::from_config(&SyncConfig::default())
    }

    #[test]
    fn test_role_classification() {
        assert_eq!(Role::classify("rust-linter"), Role::Linting);
        assert_eq!(Role::classify("lint"), Role::Linting);
        assert_eq!(Role::classify("python_tester"), Role::Testing);
        assert_eq!(Role::classify("test-runner"), Role::Testing);
        assert_eq!(Role::classify("frontend-engineer"), Role::Frontend);
        assert_eq!(Role::classify("Backend-Engineer"), Role::Backend);
        assert_eq!(Role::classify("code-reviewer"), Role::General);
        assert_eq!(Role::classify("contest-judge"), Role::General);
        assert_eq!(Role::classify("blinter"), Role::General);
    }

    #[test]
    fn test_role_precedence() {
        assert_eq!(Role::classify("backend-linter"), Role::Linting);
        assert_eq!(Role::classify("frontend-tester"), Role::Testing);
        assert_eq!(Role::classify("lint-test"), Role::Linting);
        assert_eq!(Role::classify("backend-frontend"), Role::Frontend);
    }

    #[test]
    fn test_default_strategy_table() {
        let table: Vec<_> = Role::ALL.into_iter().map(|r| (r, r.default_strategy())).collect();
        assert_eq!(
            table,
            vec![
                (Role::Linting, ExpansionStrategy::PrimaryOnly),
                (Role::Testing, ExpansionStrategy::PrimaryOnly),
                (Role::Frontend, ExpansionStrategy::Paired),
                (Role::Backend, ExpansionStrategy::Paired),
                (Role::General, ExpansionStrategy::CrossProduct),
            ]
        );
    }

    #[test]
    fn test_default_compatibility_map() {
        let config = SyncConfig::default();
        let map: Vec<(&str, Vec<&str>)> = config
            .compatibility
            .iter()
            .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(
            map,
            vec![
                ("bash", vec![]),
                ("golang", vec!["echo", "gin"]),
                ("java", vec!["spring"]),
                ("javascript", vec!["express", "react", "vue"]),
                ("python", vec!["django", "fastapi", "flask"]),
                ("rust", vec!["actix", "axum"]),
                ("typescript", vec!["angular", "express", "nestjs", "nextjs", "react", "vue"]),
            ]
        );
    }

    #[test]
    fn test_cross_product_for_general() {
        let axes = axes(&[("framework", &["django", "gin"]), ("language", &["golang", "python"])]);
        let combos = default_policy().combinations(Role::General, &axes);
        assert_eq!(combos.len(), 4);
        assert!(combos.contains(&combo(&[("language", "python"), ("framework", "gin")])));
    }

    #[test]
    fn test_primary_only_ignores_secondary() {
        let axes = axes(&[("framework", &["django", "gin"]), ("language", &["golang", "python"])]);
        let combos = default_policy().combinations(Role::Linting, &axes);
        assert_eq!(
            combos,
            vec![combo(&[("language", "golang")]), combo(&[("language", "python")])]
        );
    }

    #[test]
    fn test_primary_only_without_primary_axis_is_empty() {
        let axes = axes(&[("framework", &["django"])]);
        assert!(default_policy().combinations(Role::Testing, &axes).is_empty());
        assert!(default_policy().combinations(Role::Backend, &axes).is_empty());
    }

    #[test]
    fn test_paired_respects_compatibility() {
        let axes = axes(&[
            ("framework", &["django", "gin", "spring"]),
            ("language", &["bash", "golang", "python", "zig"]),
        ]);
        let combos = default_policy().combinations(Role::Backend, &axes);
        let mut expected = vec![
            combo(&[("language", "bash")]),
            combo(&[("language", "golang"), ("framework", "gin")]),
            combo(&[("language", "python"), ("framework", "django")]),
            combo(&[("language", "zig"), ("framework", "django")]),
            combo(&[("language", "zig"), ("framework", "gin")]),
            combo(&[("language", "zig"), ("framework", "spring")]),
        ];
        expected.sort();
        assert_eq!(combos, expected);
    }

    #[test]
    fn test_paired_without_secondary_axis() {
        let axes = axes(&[("language", &["python", "rust"])]);
        let combos = default_policy().combinations(Role::Frontend, &axes);
        assert_eq!(combos, vec![combo(&[("language", "python")]), combo(&[("language", "rust")])]);
    }

    #[test]
    fn test_paired_with_no_surviving_pairing_is_primary_only() {
        let axes = axes(&[("framework", &["rails"]), ("language", &["java"])]);
        let combos = default_policy().combinations(Role::Backend, &axes);
        assert_eq!(combos, vec![combo(&[("language", "java")])]);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let policy = CompatibilityPolicy::new(
            "language",
            BTreeMap::from([(Role::Backend, ExpansionStrategy::PrimaryOnly)]),
            BTreeMap::new(),
        );
        assert_eq!(policy.strategy_for(Role::Backend), ExpansionStrategy::PrimaryOnly);
        assert_eq!(policy.strategy_for(Role::Frontend), ExpansionStrategy::Paired);
    }

    #[test]
    fn test_no_axes_yields_nothing() {
        assert!(default_policy().combinations(Role::General, &BTreeMap::new()).is_empty());
    }
}
