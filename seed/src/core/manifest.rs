//! Seed manifest: the ordered declaration of records applied in one run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::types::ConfigurationRecord;
use crate::error::SeedError;

/// Immutable seed manifest (TOML).
///
/// Partitions are applied in field order. Every list keeps its declared order;
/// nothing here relies on map iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedManifest {
    /// Local image paths to upload as assets.
    pub assets: Vec<String>,
    pub navbar: Vec<NavbarEntry>,
    pub menu: Vec<LinkEntry>,
    /// Admin panel links, grouped by category in declared order.
    pub admin: Vec<AdminCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavbarEntry {
    pub image: String,
    pub redirect: String,
}

/// Display text paired with a redirect target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkEntry {
    pub text: String,
    pub redirect: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminCategory {
    pub category: String,
    #[serde(default)]
    pub entries: Vec<LinkEntry>,
}

impl SeedManifest {
    /// Flatten into records in application order:
    /// assets, navbar, menu, then admin (by category, then by entry).
    pub fn records(&self) -> impl Iterator<Item = ConfigurationRecord> + '_ {
        let assets = self.assets.iter().map(|image| ConfigurationRecord::Asset {
            image: image.clone(),
        });
        let navbar = self.navbar.iter().map(|entry| ConfigurationRecord::Navbar {
            image: entry.image.clone(),
            redirect: entry.redirect.clone(),
        });
        let menu = self.menu.iter().map(|entry| ConfigurationRecord::Menu {
            text: entry.text.clone(),
            redirect: entry.redirect.clone(),
        });
        let admin = self.admin.iter().flat_map(|group| {
            group
                .entries
                .iter()
                .map(move |entry| ConfigurationRecord::Admin {
                    category: group.category.clone(),
                    text: entry.text.clone(),
                    redirect: entry.redirect.clone(),
                })
        });
        assets.chain(navbar).chain(menu).chain(admin)
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.assets.len()
            + self.navbar.len()
            + self.menu.len()
            + self
                .admin
                .iter()
                .map(|group| group.entries.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect every structural problem (empty fields, duplicate admin categories).
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (index, image) in self.assets.iter().enumerate() {
            if image.trim().is_empty() {
                problems.push(format!("assets[{index}]: image path is empty"));
            }
        }
        for (index, entry) in self.navbar.iter().enumerate() {
            if entry.image.trim().is_empty() {
                problems.push(format!("navbar[{index}]: image is empty"));
            }
            if entry.redirect.trim().is_empty() {
                problems.push(format!("navbar[{index}]: redirect is empty"));
            }
        }
        for (index, entry) in self.menu.iter().enumerate() {
            check_link(&format!("menu[{index}]"), entry, &mut problems);
        }

        let mut seen = HashSet::new();
        for (index, group) in self.admin.iter().enumerate() {
            if group.category.trim().is_empty() {
                problems.push(format!("admin[{index}]: category is empty"));
            } else if !seen.insert(group.category.as_str()) {
                problems.push(format!(
                    "admin[{index}]: duplicate category {:?}",
                    group.category
                ));
            }
            for (entry_index, entry) in group.entries.iter().enumerate() {
                check_link(
                    &format!("admin[{index}].entries[{entry_index}]"),
                    entry,
                    &mut problems,
                );
            }
        }

        problems
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SeedError::InvalidManifest { problems })
        }
    }
}

fn check_link(location: &str, entry: &LinkEntry, problems: &mut Vec<String>) {
    if entry.text.trim().is_empty() {
        problems.push(format!("{location}: text is empty"));
    }
    if entry.redirect.trim().is_empty() {
        problems.push(format!("{location}: redirect is empty"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ToolMode;
    use crate::test_support::{link, sample_manifest};

    #[test]
    fn records_follow_category_order() {
        let manifest = sample_manifest();
        let modes: Vec<ToolMode> = manifest.records().map(|r| r.mode()).collect();
        assert_eq!(
            modes,
            vec![
                ToolMode::Asset,
                ToolMode::Asset,
                ToolMode::Nav,
                ToolMode::Admin,
                ToolMode::Admin,
            ]
        );
        assert_eq!(manifest.len(), 5);
    }

    #[test]
    fn admin_records_keep_declared_category_order() {
        let manifest = SeedManifest {
            admin: vec![
                AdminCategory {
                    category: "modify".to_string(),
                    entries: vec![link("b", "/b1"), link("a", "/a1")],
                },
                AdminCategory {
                    category: "new".to_string(),
                    entries: vec![link("c", "/c1")],
                },
            ],
            ..SeedManifest::default()
        };
        let labels: Vec<String> = manifest.records().map(|r| r.label()).collect();
        assert_eq!(
            labels,
            vec![
                "admin [modify] b -> /b1",
                "admin [modify] a -> /a1",
                "admin [new] c -> /c1",
            ]
        );
    }

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = SeedManifest::default();
        assert!(manifest.is_empty());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn problems_report_empty_fields_and_duplicates() {
        let manifest = SeedManifest {
            assets: vec![" ".to_string()],
            navbar: vec![NavbarEntry {
                image: "./a.png".to_string(),
                redirect: String::new(),
            }],
            menu: vec![link("", "/x")],
            admin: vec![
                AdminCategory {
                    category: "new".to_string(),
                    entries: vec![],
                },
                AdminCategory {
                    category: "new".to_string(),
                    entries: vec![link("y", "")],
                },
            ],
        };

        let problems = manifest.problems();
        assert!(problems.iter().any(|p| p.contains("assets[0]")));
        assert!(problems.iter().any(|p| p.contains("navbar[0]: redirect")));
        assert!(problems.iter().any(|p| p.contains("menu[0]: text")));
        assert!(problems.iter().any(|p| p.contains("duplicate category")));
        assert!(
            problems
                .iter()
                .any(|p| p.contains("admin[1].entries[0]: redirect"))
        );

        let err = manifest.validate().unwrap_err();
        assert!(matches!(err, SeedError::InvalidManifest { .. }));
    }
}
