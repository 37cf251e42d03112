//! 关注列表
//!
//! 学院 → 系 → 课程号 → 班级号集合，纯数据结构，不做任何 I/O

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::error::WatchListError;

/// 某个系下被关注的课程（课程号 → 班级号）
pub type WatchedCourses = BTreeMap<String, BTreeSet<u32>>;

/// 课程编号
///
/// 按固定位置切分：前 2 位学院、接着 2 位系、剩下的是课程号
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseKey {
    pub faculty_id: String,
    pub department_id: String,
    pub course_number: String,
}

impl CourseKey {
    pub fn parse(course_id: &str) -> Result<Self, WatchListError> {
        let invalid = || WatchListError::InvalidCourseId(course_id.to_string());
        if course_id.len() < 5 {
            return Err(invalid());
        }

        let faculty_id = course_id.get(0..2).ok_or_else(invalid)?;
        let department_id = course_id.get(2..4).ok_or_else(invalid)?;
        let course_number = course_id.get(4..).ok_or_else(invalid)?;

        Ok(Self {
            faculty_id: faculty_id.to_string(),
            department_id: department_id.to_string(),
            course_number: course_number.to_string(),
        })
    }

    /// 完整课程编号（网页上显示的形式）
    pub fn full_id(&self) -> String {
        format!(
            "{}{}{}",
            self.faculty_id, self.department_id, self.course_number
        )
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.faculty_id, self.department_id, self.course_number
        )
    }
}

/// 班级号输入
///
/// 可以是单个数字、空格分隔的字符串，或者数字/数字字符串的列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionSpec {
    Single(i64),
    Delimited(String),
    Sequence(Vec<SectionItem>),
    /// 配置文件里出现的其它类型（小数、布尔、表等）
    Unsupported(String),
}

/// 列表中的单个班级号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionItem {
    Number(i64),
    Text(String),
    Unsupported(String),
}

impl SectionSpec {
    /// 统一转换成班级号集合
    pub fn normalize(&self) -> Result<BTreeSet<u32>, WatchListError> {
        match self {
            SectionSpec::Single(n) => Ok(BTreeSet::from([to_section(*n)?])),
            SectionSpec::Delimited(text) => text.split_whitespace().map(parse_section).collect(),
            SectionSpec::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    SectionItem::Number(n) => to_section(*n),
                    SectionItem::Text(text) => parse_section(text.trim()),
                    SectionItem::Unsupported(desc) => {
                        Err(WatchListError::InvalidSectionSpec(desc.clone()))
                    }
                })
                .collect(),
            SectionSpec::Unsupported(desc) => Err(WatchListError::InvalidSectionSpec(desc.clone())),
        }
    }
}

fn to_section(n: i64) -> Result<u32, WatchListError> {
    u32::try_from(n).map_err(|_| WatchListError::InvalidSectionSpec(n.to_string()))
}

fn parse_section(token: &str) -> Result<u32, WatchListError> {
    token
        .parse::<u32>()
        .map_err(|_| WatchListError::InvalidSectionSpec(format!("'{}'", token)))
}

impl From<u32> for SectionSpec {
    fn from(n: u32) -> Self {
        SectionSpec::Single(n.into())
    }
}

impl From<i64> for SectionSpec {
    fn from(n: i64) -> Self {
        SectionSpec::Single(n)
    }
}

impl From<i32> for SectionSpec {
    fn from(n: i32) -> Self {
        SectionSpec::Single(n.into())
    }
}

impl From<&str> for SectionSpec {
    fn from(text: &str) -> Self {
        SectionSpec::Delimited(text.to_string())
    }
}

impl From<String> for SectionSpec {
    fn from(text: String) -> Self {
        SectionSpec::Delimited(text)
    }
}

impl From<Vec<u32>> for SectionSpec {
    fn from(items: Vec<u32>) -> Self {
        SectionSpec::Sequence(items.into_iter().map(|n| SectionItem::Number(n.into())).collect())
    }
}

impl From<&[u32]> for SectionSpec {
    fn from(items: &[u32]) -> Self {
        items.to_vec().into()
    }
}

impl<const N: usize> From<[u32; N]> for SectionSpec {
    fn from(items: [u32; N]) -> Self {
        items.to_vec().into()
    }
}

impl<const N: usize> From<[i32; N]> for SectionSpec {
    fn from(items: [i32; N]) -> Self {
        SectionSpec::Sequence(items.iter().map(|n| SectionItem::Number((*n).into())).collect())
    }
}

impl From<Vec<&str>> for SectionSpec {
    fn from(items: Vec<&str>) -> Self {
        SectionSpec::Sequence(items.into_iter().map(|s| SectionItem::Text(s.to_string())).collect())
    }
}

impl From<Vec<String>> for SectionSpec {
    fn from(items: Vec<String>) -> Self {
        SectionSpec::Sequence(items.into_iter().map(SectionItem::Text).collect())
    }
}

// 配置文件中的班级号可以是数字、字符串或列表
impl<'de> Deserialize<'de> for SectionSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SectionSpecVisitor;

        impl<'de> Visitor<'de> for SectionSpecVisitor {
            type Value = SectionSpec;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer, a space separated string or a list of sections")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<SectionSpec, E> {
                Ok(SectionSpec::Single(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<SectionSpec, E> {
                Ok(i64::try_from(value)
                    .map(SectionSpec::Single)
                    .unwrap_or_else(|_| SectionSpec::Unsupported(value.to_string())))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<SectionSpec, E> {
                Ok(SectionSpec::Unsupported(format!("float {}", value)))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<SectionSpec, E> {
                Ok(SectionSpec::Unsupported(format!("bool {}", value)))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<SectionSpec, E> {
                Ok(SectionSpec::Delimited(value.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SectionSpec, A::Error> {
                while map
                    .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
                    .is_some()
                {}
                Ok(SectionSpec::Unsupported("table".to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SectionSpec, A::Error> {
                let mut items = Vec::new();
                while let Some(element) = seq.next_element::<SectionSpec>()? {
                    items.push(match element {
                        SectionSpec::Single(n) => SectionItem::Number(n),
                        SectionSpec::Delimited(text) => SectionItem::Text(text),
                        SectionSpec::Sequence(_) => SectionItem::Unsupported("nested list".into()),
                        SectionSpec::Unsupported(desc) => SectionItem::Unsupported(desc),
                    });
                }
                Ok(SectionSpec::Sequence(items))
            }
        }

        deserializer.deserialize_any(SectionSpecVisitor)
    }
}

/// 关注列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    faculties: BTreeMap<String, BTreeMap<String, WatchedCourses>>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加要关注的班级
    ///
    /// 重复添加同一个班级不会有任何变化；班级号格式不对时整个调用失败，列表保持不变
    pub fn add_sections(
        &mut self,
        course_id: &str,
        sections: impl Into<SectionSpec>,
    ) -> Result<CourseKey, WatchListError> {
        let key = CourseKey::parse(course_id)?;
        let sections = sections.into().normalize()?;

        self.faculties
            .entry(key.faculty_id.clone())
            .or_default()
            .entry(key.department_id.clone())
            .or_default()
            .entry(key.course_number.clone())
            .or_default()
            .extend(sections);

        Ok(key)
    }

    /// 查询某门课程正在关注的班级
    pub fn sections_for(&self, course_id: &str) -> Option<&BTreeSet<u32>> {
        let key = CourseKey::parse(course_id).ok()?;
        self.faculties
            .get(&key.faculty_id)?
            .get(&key.department_id)?
            .get(&key.course_number)
    }

    /// 按 (学院, 系, 课程) 遍历
    pub fn departments(&self) -> impl Iterator<Item = (&str, &str, &WatchedCourses)> {
        self.faculties.iter().flat_map(|(faculty, departments)| {
            departments
                .iter()
                .map(move |(department, courses)| (faculty.as_str(), department.as_str(), courses))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.faculties.is_empty()
    }

    pub fn course_count(&self) -> usize {
        self.departments().map(|(_, _, courses)| courses.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_key_split() {
        let key = CourseKey::parse("0907528").unwrap();
        assert_eq!(key.faculty_id, "09");
        assert_eq!(key.department_id, "07");
        assert_eq!(key.course_number, "528");
        assert_eq!(key.full_id(), "0907528");

        // 重复切分结果一致
        assert_eq!(CourseKey::parse("0907528").unwrap(), key);

        let short = CourseKey::parse("03012").unwrap();
        assert_eq!(short.course_number, "2");
    }

    #[test]
    fn test_course_key_too_short() {
        assert!(matches!(
            CourseKey::parse("0907"),
            Err(WatchListError::InvalidCourseId(_))
        ));
        assert!(CourseKey::parse("").is_err());
    }

    #[test]
    fn test_add_sections_builds_hierarchy() {
        let mut list = WatchList::new();
        list.add_sections("0907528", [1, 2, 3]).unwrap();
        list.add_sections("0301211", vec![1u32, 2]).unwrap();

        let departments: Vec<_> = list.departments().map(|(f, d, _)| (f, d)).collect();
        assert_eq!(departments, vec![("03", "01"), ("09", "07")]);
        assert_eq!(list.course_count(), 2);
        assert_eq!(
            list.sections_for("0907528"),
            Some(&BTreeSet::from([1, 2, 3]))
        );
    }

    #[test]
    fn test_add_sections_idempotent() {
        let mut list = WatchList::new();
        list.add_sections("0907528", 2u32).unwrap();
        let before = list.clone();
        list.add_sections("0907528", 2u32).unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_input_shapes_are_equivalent() {
        let mut from_ints = WatchList::new();
        from_ints.add_sections("0907528", 1u32).unwrap();
        from_ints.add_sections("0907528", 2u32).unwrap();

        let mut from_text = WatchList::new();
        from_text.add_sections("0907528", "1   2").unwrap();

        let mut from_strings = WatchList::new();
        from_strings.add_sections("0907528", vec!["1", "2"]).unwrap();

        let mut from_vec = WatchList::new();
        from_vec.add_sections("0907528", vec![2u32, 1, 2]).unwrap();

        assert_eq!(from_ints, from_text);
        assert_eq!(from_ints, from_strings);
        assert_eq!(from_ints, from_vec);
    }

    #[test]
    fn test_invalid_section_spec() {
        let mut list = WatchList::new();
        assert!(matches!(
            list.add_sections("0907528", "1 two"),
            Err(WatchListError::InvalidSectionSpec(_))
        ));
        assert!(matches!(
            list.add_sections("0907528", -3i64),
            Err(WatchListError::InvalidSectionSpec(_))
        ));
        assert!(matches!(
            list.add_sections("0907528", SectionSpec::Unsupported("float 1.5".into())),
            Err(WatchListError::InvalidSectionSpec(_))
        ));
        // 失败的调用不应留下半截数据
        assert!(list.is_empty());
    }

    #[derive(Deserialize)]
    struct Entry {
        sections: SectionSpec,
    }

    #[test]
    fn test_deserialize_section_spec() {
        let single: Entry = toml::from_str("sections = 3").unwrap();
        assert_eq!(single.sections, SectionSpec::Single(3));

        let text: Entry = toml::from_str(r#"sections = "1 2""#).unwrap();
        assert_eq!(text.sections.normalize().unwrap(), BTreeSet::from([1, 2]));

        let mixed: Entry = toml::from_str(r#"sections = [1, "2"]"#).unwrap();
        assert_eq!(mixed.sections.normalize().unwrap(), BTreeSet::from([1, 2]));

        let float: Entry = toml::from_str("sections = 1.5").unwrap();
        assert!(float.sections.normalize().is_err());

        let table: Entry = toml::from_str("sections = { a = 1 }").unwrap();
        assert!(table.sections.normalize().is_err());
    }
}
