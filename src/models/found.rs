use std::collections::BTreeMap;

use serde::Serialize;

/// 一轮检查中发现的空位
///
/// 完整课程编号 → 按发现顺序排列的开放班级号；
/// 没有空位的课程不会出现在结果中（而不是空列表）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FoundResult {
    courses: BTreeMap<String, Vec<u32>>,
}

impl FoundResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个开放的班级，同一个班级只记录一次
    pub fn record(&mut self, course_id: &str, section: u32) {
        let sections = self.courses.entry(course_id.to_string()).or_default();
        if !sections.contains(&section) {
            sections.push(section);
        }
    }

    /// 合并另一份（部分）结果
    pub fn merge(&mut self, other: FoundResult) {
        for (course_id, sections) in other.courses {
            for section in sections {
                self.record(&course_id, section);
            }
        }
    }

    pub fn get(&self, course_id: &str) -> Option<&[u32]> {
        self.courses.get(course_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.courses
            .iter()
            .map(|(course_id, sections)| (course_id.as_str(), sections.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<u32>> {
        self.courses
    }
}
