//! 开课列表扫描服务 - 业务能力层
//!
//! 列表表格没有稳定的机器可读属性，只能按课程编号文字查找，
//! 再按固定列位置读取状态和班级号

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::PortalConfig;
use crate::error::AppResult;
use crate::infrastructure::{Navigator, PortalDriver};
use crate::models::{Catalog, FoundResult, WatchedCourses};

/// 下拉框顺序：学位、学院、系
const DEGREE_DROPDOWN: usize = 0;
const FACULTY_DROPDOWN: usize = 1;
const DEPARTMENT_DROPDOWN: usize = 2;

pub struct Scanner<D> {
    navigator: Arc<Navigator<D>>,
    portal: Arc<PortalConfig>,
    catalog: Arc<Catalog>,
    pagination_wait: Duration,
}

impl<D: PortalDriver> Scanner<D> {
    pub fn new(
        navigator: Arc<Navigator<D>>,
        portal: Arc<PortalConfig>,
        catalog: Arc<Catalog>,
        pagination_wait: Duration,
    ) -> Self {
        Self {
            navigator,
            portal,
            catalog,
            pagination_wait,
        }
    }

    /// 打开开课查询页并选好学位
    pub async fn open_schedule(&self) -> AppResult<()> {
        self.navigator.goto(&self.portal.schedule_url).await?;
        self.navigator
            .driver()
            .select_option(&self.portal.dropdowns(), DEGREE_DROPDOWN, self.portal.degree_option)
            .await?;
        self.navigator.settle().await;
        Ok(())
    }

    /// 扫描一个系，返回其中开放的关注班级
    pub async fn scan(
        &self,
        faculty_id: &str,
        department_id: &str,
        courses: &WatchedCourses,
    ) -> AppResult<FoundResult> {
        let driver = self.navigator.driver();
        let dropdowns = self.portal.dropdowns();
        let (faculty_index, department_index) = self.catalog.lookup(faculty_id, department_id)?;

        driver
            .select_option(&dropdowns, FACULTY_DROPDOWN, faculty_index)
            .await?;
        self.navigator.settle().await;
        driver
            .select_option(&dropdowns, DEPARTMENT_DROPDOWN, department_index)
            .await?;

        let prefix = format!("{}{}", faculty_id, department_id);
        let mut found = FoundResult::new();

        // 等不到分页控件说明结果只有一页
        let pages = if driver.wait_for(&self.portal.paginator(), self.pagination_wait).await? {
            driver.count(&self.portal.paginator_pages()).await?
        } else {
            0
        };

        if pages == 0 {
            self.extract_page(&prefix, courses, &mut found).await?;
        } else {
            debug!("系 {} 共 {} 页", prefix, pages);
            let page_links = self.portal.paginator_pages();
            for page in 0..pages {
                driver.click(&page_links, page).await?;
                self.extract_page(&prefix, courses, &mut found).await?;
            }
        }

        if !found.is_empty() {
            info!("✓ 系 {} 发现 {} 门课程有空位", prefix, found.len());
        }
        Ok(found)
    }

    /// 读取当前页中所有关注课程的行
    async fn extract_page(
        &self,
        prefix: &str,
        courses: &WatchedCourses,
        found: &mut FoundResult,
    ) -> AppResult<()> {
        self.navigator.settle().await;
        let driver = self.navigator.driver();

        for (course_number, sections) in courses {
            let course_id = format!("{}{}", prefix, course_number);
            let rows = self.portal.course_rows(&course_id);
            let occurrences = driver.count(&rows).await?;

            for nth in 0..occurrences {
                let cells = driver.read_texts(&rows, nth).await?;
                if let Some(section) = open_section(&cells, &self.portal, sections) {
                    debug!("{} 第 {} 班有空位", course_id, section);
                    found.record(&course_id, section);
                }
            }
        }
        Ok(())
    }
}

/// 状态列为开放且班级号在关注列表中时返回班级号
pub fn open_section(cells: &[String], portal: &PortalConfig, watched: &BTreeSet<u32>) -> Option<u32> {
    let status = cells.get(portal.status_cell)?;
    if status.trim() != portal.open_status {
        return None;
    }
    let section = cells.get(portal.section_cell)?.trim().parse::<u32>().ok()?;
    watched.contains(&section).then_some(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(section: &str, status: &str) -> Vec<String> {
        let mut cells = vec![String::new(); 14];
        cells[0] = "0907528".to_string();
        cells[3] = section.to_string();
        cells[12] = status.to_string();
        cells
    }

    #[test]
    fn test_open_section_requires_status_and_watch() {
        let portal = PortalConfig::default();
        let watched = BTreeSet::from([1, 2, 3]);

        assert_eq!(open_section(&row("1", "Opened"), &portal, &watched), Some(1));
        assert_eq!(open_section(&row("2", "Closed"), &portal, &watched), None);
        assert_eq!(open_section(&row("5", "Opened"), &portal, &watched), None);
    }

    #[test]
    fn test_open_section_tolerates_bad_rows() {
        let portal = PortalConfig::default();
        let watched = BTreeSet::from([1]);

        let short: Vec<String> = vec!["0907528".into(), "x".into()];
        assert_eq!(open_section(&short, &portal, &watched), None);
        assert_eq!(open_section(&row("n/a", "Opened"), &portal, &watched), None);
        assert_eq!(open_section(&row(" 1 ", "Opened"), &portal, &watched), Some(1));
    }
}
