use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::config::PortalConfig;
use crate::error::{AppError, AppResult, ConfigError, WatchListError};
use crate::models::catalog::FacultyIndex;
use crate::models::watch_list::{SectionSpec, WatchList};

/// 关注文件
///
/// ```toml
/// [[course]]
/// id = "0907528"
/// sections = [1, 2, 3]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct WatchFile {
    /// 覆盖门户参数
    #[serde(default)]
    pub portal: Option<PortalConfig>,
    /// 覆盖内置学院/系目录
    #[serde(default)]
    pub catalog: BTreeMap<String, FacultyIndex>,
    #[serde(default, rename = "course")]
    pub courses: Vec<CourseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseEntry {
    pub id: String,
    pub sections: SectionSpec,
}

impl WatchFile {
    /// 按文件内容构建关注列表
    pub fn watch_list(&self) -> Result<WatchList, WatchListError> {
        let mut list = WatchList::new();
        for entry in &self.courses {
            list.add_sections(&entry.id, entry.sections.clone())?;
        }
        Ok(list)
    }
}

pub fn parse_watch_file(content: &str, source: &str) -> Result<WatchFile, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::WatchFileParseFailed {
        path: source.to_string(),
        source: Box::new(e),
    })
}

/// 读取并解析关注文件
pub async fn load_watch_file(path: &Path) -> AppResult<WatchFile> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let file = parse_watch_file(&content, &path.display().to_string())?;
    tracing::info!(
        "已加载关注文件 {}: {} 门课程",
        path.display(),
        file.courses.len()
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const SAMPLE: &str = r#"
        [portal]
        status_cell = 11

        [catalog."09"]
        index = 9
        departments = { "07" = 7 }

        [[course]]
        id = "0907528"
        sections = [1, 2, 3]

        [[course]]
        id = "0301211"
        sections = "1 2"
    "#;

    #[test]
    fn test_parse_sample() {
        let file = parse_watch_file(SAMPLE, "watch.toml").unwrap();
        assert_eq!(file.portal.as_ref().map(|p| p.status_cell), Some(11));
        assert_eq!(file.catalog["09"].departments["07"], 7);

        let list = file.watch_list().unwrap();
        assert_eq!(list.sections_for("0907528"), Some(&BTreeSet::from([1, 2, 3])));
        assert_eq!(list.sections_for("0301211"), Some(&BTreeSet::from([1, 2])));
    }

    #[test]
    fn test_unsupported_sections_fail_at_watch_list() {
        let file = parse_watch_file("[[course]]\nid = \"0907528\"\nsections = 2.5\n", "w.toml")
            .unwrap();
        assert!(matches!(
            file.watch_list(),
            Err(WatchListError::InvalidSectionSpec(_))
        ));
    }

    #[test]
    fn test_broken_toml() {
        assert!(matches!(
            parse_watch_file("[[course]\n", "w.toml"),
            Err(ConfigError::WatchFileParseFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let file = load_watch_file(&path).await.unwrap();
        assert_eq!(file.courses.len(), 2);
    }
}
