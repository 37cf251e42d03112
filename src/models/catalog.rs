//! 学院 / 系下拉框目录
//!
//! 系的下拉选项取决于所选学院，这层对应关系是固定数据，不从页面计算

use std::collections::BTreeMap;

use phf::phf_map;
use serde::Deserialize;

use crate::error::ConfigError;

/// 内置目录条目
pub struct FacultyEntry {
    /// 学院在下拉框中的位置
    pub index: usize,
    /// (系编号, 系在下拉框中的位置)
    pub departments: &'static [(&'static str, usize)],
}

static BUILTIN_FACULTIES: phf::Map<&'static str, FacultyEntry> = phf_map! {
    "01" => FacultyEntry {
        index: 1,
        departments: &[("01", 1), ("02", 2), ("03", 3), ("04", 4), ("05", 5)],
    },
    "03" => FacultyEntry {
        index: 3,
        departments: &[("01", 1), ("02", 2), ("03", 3), ("04", 4), ("05", 5), ("06", 6)],
    },
    "09" => FacultyEntry {
        index: 8,
        departments: &[
            ("01", 1),
            ("02", 2),
            ("03", 3),
            ("04", 4),
            ("05", 5),
            ("06", 6),
            ("07", 7),
            ("08", 8),
        ],
    },
    "19" => FacultyEntry {
        index: 17,
        departments: &[("01", 1), ("02", 2), ("03", 3)],
    },
};

/// 单个学院的下拉框位置（可在关注文件中覆盖）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacultyIndex {
    pub index: usize,
    #[serde(default)]
    pub departments: BTreeMap<String, usize>,
}

/// 目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    faculties: BTreeMap<String, FacultyIndex>,
}

impl Default for Catalog {
    fn default() -> Self {
        let faculties = BUILTIN_FACULTIES
            .entries()
            .map(|(id, entry)| {
                let departments = entry
                    .departments
                    .iter()
                    .map(|(dep, idx)| (dep.to_string(), *idx))
                    .collect();
                (
                    id.to_string(),
                    FacultyIndex {
                        index: entry.index,
                        departments,
                    },
                )
            })
            .collect();
        Self { faculties }
    }
}

impl Catalog {
    /// 用配置覆盖内置目录：学院位置直接替换，系按编号合并
    pub fn with_overrides(mut self, overrides: BTreeMap<String, FacultyIndex>) -> Self {
        for (faculty_id, custom) in overrides {
            match self.faculties.get_mut(&faculty_id) {
                Some(existing) => {
                    existing.index = custom.index;
                    existing.departments.extend(custom.departments);
                }
                None => {
                    self.faculties.insert(faculty_id, custom);
                }
            }
        }
        self
    }

    /// 查询 (学院位置, 系位置)
    pub fn lookup(&self, faculty_id: &str, department_id: &str) -> Result<(usize, usize), ConfigError> {
        let faculty = self
            .faculties
            .get(faculty_id)
            .ok_or_else(|| ConfigError::UnknownFaculty(faculty_id.to_string()))?;
        let department = faculty.departments.get(department_id).ok_or_else(|| {
            ConfigError::UnknownDepartment {
                faculty: faculty_id.to_string(),
                department: department_id.to_string(),
            }
        })?;
        Ok((faculty.index, *department))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::default();
        assert_eq!(catalog.lookup("09", "07").unwrap(), (8, 7));
    }

    #[test]
    fn test_unknown_entries() {
        let catalog = Catalog::default();
        assert!(matches!(
            catalog.lookup("99", "01"),
            Err(ConfigError::UnknownFaculty(_))
        ));
        assert!(matches!(
            catalog.lookup("09", "99"),
            Err(ConfigError::UnknownDepartment { .. })
        ));
    }

    #[test]
    fn test_overrides_merge_departments() {
        let overrides = BTreeMap::from([
            (
                "09".to_string(),
                FacultyIndex {
                    index: 10,
                    departments: BTreeMap::from([("09".to_string(), 9)]),
                },
            ),
            (
                "42".to_string(),
                FacultyIndex {
                    index: 30,
                    departments: BTreeMap::from([("01".to_string(), 1)]),
                },
            ),
        ]);
        let catalog = Catalog::default().with_overrides(overrides);

        assert_eq!(catalog.lookup("09", "07").unwrap(), (10, 7));
        assert_eq!(catalog.lookup("09", "09").unwrap(), (10, 9));
        assert_eq!(catalog.lookup("42", "01").unwrap(), (30, 1));
    }
}
