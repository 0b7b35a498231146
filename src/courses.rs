use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::collate::compare_base;
use crate::extract::ParseError;
use crate::model::{normalize, Course};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseSortMode {
    NameAsc,
    #[default]
    NameDesc,
    CfuAsc,
    CfuDesc,
}

impl CourseSortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseSortMode::NameAsc => "nameAsc",
            CourseSortMode::NameDesc => "nameDesc",
            CourseSortMode::CfuAsc => "cfuAsc",
            CourseSortMode::CfuDesc => "cfuDesc",
        }
    }
}

impl fmt::Display for CourseSortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseSortMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nameAsc" => Ok(CourseSortMode::NameAsc),
            "nameDesc" => Ok(CourseSortMode::NameDesc),
            "cfuAsc" => Ok(CourseSortMode::CfuAsc),
            "cfuDesc" => Ok(CourseSortMode::CfuDesc),
            _ => Err(ParseError::CourseSortMode(s.to_string())),
        }
    }
}

/// Normalized text a course card is searched by.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchFields {
    name: String,
    cfu: i64,
    professor: String,
    majors: String,
}

impl SearchFields {
    fn of(course: &Course) -> Self {
        let professor = course
            .professor
            .as_ref()
            .map(|p| {
                format!(
                    "{} {}",
                    p.name.as_deref().unwrap_or(""),
                    p.surname.as_deref().unwrap_or("")
                )
            })
            .unwrap_or_default();
        let majors = course
            .majors
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|m| m.search_label())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            name: normalize(course.name.as_deref().unwrap_or("")),
            cfu: course.cfu.unwrap_or(0),
            professor: normalize(&professor),
            majors: normalize(&majors),
        }
    }

    fn matches(&self, query: &str) -> bool {
        format!("{} {} {}", self.name, self.professor, self.majors).contains(query)
    }
}

fn compare(a: &SearchFields, b: &SearchFields, mode: CourseSortMode) -> Ordering {
    match mode {
        CourseSortMode::NameAsc => compare_base(&a.name, &b.name),
        CourseSortMode::NameDesc => compare_base(&b.name, &a.name),
        CourseSortMode::CfuAsc => a.cfu.cmp(&b.cfu),
        CourseSortMode::CfuDesc => b.cfu.cmp(&a.cfu),
    }
}

/// Indices of the courses matching `query`, ordered by `mode`. Stable.
pub fn filter_and_sort(courses: &[Course], query: &str, mode: CourseSortMode) -> Vec<usize> {
    let query = normalize(query);
    let mut visible: Vec<(usize, SearchFields)> = courses
        .iter()
        .map(SearchFields::of)
        .enumerate()
        .filter(|(_, f)| f.matches(&query))
        .collect();
    visible.sort_by(|(_, a), (_, b)| compare(a, b, mode));
    visible.into_iter().map(|(idx, _)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn courses() -> Vec<Course> {
        [
            json!({ "id": 1, "name": "Analisi I", "cfu": 10,
                    "professor": { "name": "Maria", "surname": "Rossi" },
                    "majors": [{ "name": "Ingegneria Informatica", "degreeLevel": { "name": "Triennale" } }] }),
            json!({ "id": 2, "name": "Basi di Dati", "cfu": 5,
                    "professor": { "name": "Luca", "surname": "Verdi" },
                    "majors": [{ "name": "Ingegneria Informatica", "degreeLevel": { "name": "Triennale" } }] }),
            json!({ "id": 3, "name": "Élettrotecnica", "cfu": "8",
                    "professor": { "name": "Paolo", "surname": "Bianchi" },
                    "majors": [{ "name": "Ingegneria Elettrica", "degreeLevel": { "name": "Magistrale" } }] }),
            json!({ "id": 4, "name": "Fisica", "professor": null }),
        ]
        .iter()
        .map(Course::from_json)
        .collect()
    }

    fn ids(courses: &[Course], order: &[usize]) -> Vec<i64> {
        order.iter().filter_map(|&i| courses[i].id).collect()
    }

    #[test]
    fn default_mode_is_name_descending() {
        let c = courses();
        let order = filter_and_sort(&c, "", CourseSortMode::default());
        assert_eq!(ids(&c, &order), vec![4, 3, 2, 1]);
    }

    #[test]
    fn modes_parse_from_wire_names() {
        assert_eq!("cfuAsc".parse::<CourseSortMode>(), Ok(CourseSortMode::CfuAsc));
        assert!("size".parse::<CourseSortMode>().is_err());
    }

    #[test]
    fn cfu_sorts_numerically_with_missing_as_zero() {
        let c = courses();
        assert_eq!(ids(&c, &filter_and_sort(&c, "", CourseSortMode::CfuAsc)), vec![4, 2, 3, 1]);
        assert_eq!(ids(&c, &filter_and_sort(&c, "", CourseSortMode::CfuDesc)), vec![1, 3, 2, 4]);
    }

    #[test]
    fn query_matches_name_professor_and_major() {
        let c = courses();
        assert_eq!(ids(&c, &filter_and_sort(&c, "  ROSSI ", CourseSortMode::NameAsc)), vec![1]);
        assert_eq!(ids(&c, &filter_and_sort(&c, "informatica", CourseSortMode::NameAsc)), vec![1, 2]);
        assert_eq!(ids(&c, &filter_and_sort(&c, "magistrale", CourseSortMode::NameAsc)), vec![3]);
        assert!(filter_and_sort(&c, "chimica", CourseSortMode::NameAsc).is_empty());
    }
}
