use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::collate::compare_base;
use crate::extract::{extract_sort_value, ParseError, SortKey, SortValue, SortingContext};
use crate::model::Registration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(ParseError::SortDirection(s.to_string())),
        }
    }
}

/// The active column and direction of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: SortKey,
    #[serde(rename = "dir")]
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortKey::StudentNumber)
    }
}

impl SortState {
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    /// Same key flips the direction; a different key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Numbers compare numerically; anything else compares as text at base
/// strength.
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.cmp(y),
        _ => compare_base(&text_of(a), &text_of(b)),
    }
}

fn text_of(v: &SortValue) -> std::borrow::Cow<'_, str> {
    match v {
        SortValue::Number(n) => n.to_string().into(),
        SortValue::Text(s) => s.as_str().into(),
    }
}

pub type TieBreak<'a, T> = &'a dyn Fn(&T, &T) -> Ordering;

/// Order `items` by the active column of `state`.
///
/// Ties on the column fall through to `tie_break`, which is applied as-is
/// regardless of direction. The sort is stable, so ties that survive keep
/// their input order. The input is not touched.
pub fn sort_by_spec<'t, T, F>(
    items: &'t [T],
    state: &SortState,
    extract: F,
    tie_break: Option<TieBreak<'_, T>>,
) -> Vec<&'t T>
where
    F: Fn(&T, SortKey) -> SortValue,
{
    let mut keyed: Vec<(SortValue, &T)> = items
        .iter()
        .map(|item| (extract(item, state.key), item))
        .collect();

    keyed.sort_by(|(va, a), (vb, b)| {
        let ord = state.direction.apply(compare_values(va, vb));
        match (ord, tie_break) {
            (Ordering::Equal, Some(tb)) => tb(*a, *b),
            _ => ord,
        }
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Student number ascending, missing numbers as 0.
pub fn by_student_number(a: &Registration, b: &Registration) -> Ordering {
    a.student_number()
        .unwrap_or(0)
        .cmp(&b.student_number().unwrap_or(0))
}

/// Positions of `regs` in display order, student number breaking ties.
pub fn registration_order(regs: &[Registration], state: &SortState, ctx: &SortingContext) -> Vec<usize> {
    let positions: Vec<usize> = (0..regs.len()).collect();
    let tie = |a: &usize, b: &usize| by_student_number(&regs[*a], &regs[*b]);
    let tie: TieBreak<'_, usize> = &tie;
    sort_by_spec(
        &positions,
        state,
        |&i, key| extract_sort_value(&regs[i], key, ctx),
        Some(tie),
    )
    .into_iter()
    .copied()
    .collect()
}

/// Positions of the registrations still in the first status of the
/// vocabulary (no grade entered yet), by student number.
pub fn pending_order(regs: &[Registration], ctx: &SortingContext) -> Vec<usize> {
    registration_order(regs, &SortState::new(SortKey::StudentNumber), ctx)
        .into_iter()
        .filter(|&i| extract_sort_value(&regs[i], SortKey::Status, ctx) == SortValue::Number(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReferenceResult;
    use serde_json::json;

    fn regs(v: serde_json::Value) -> Vec<Registration> {
        v.as_array()
            .map(|a| a.iter().map(Registration::from_json).collect())
            .unwrap_or_default()
    }

    fn sort_registrations<'t>(
        regs: &'t [Registration],
        state: &SortState,
        ctx: &SortingContext,
    ) -> Vec<&'t Registration> {
        registration_order(regs, state, ctx)
            .into_iter()
            .map(|i| &regs[i])
            .collect()
    }

    fn numbers(sorted: &[&Registration]) -> Vec<i64> {
        sorted.iter().map(|r| r.student_number().unwrap_or(-1)).collect()
    }

    fn ctx() -> SortingContext {
        let reference: Vec<ReferenceResult> = serde_json::from_value(json!([
            { "id": 1, "value": "absent" },
            { "id": 2, "value": "failed" },
            { "id": 3, "value": "18" },
            { "id": 4, "value": "30" }
        ]))
        .expect("reference");
        SortingContext::new::<&str>(&reference, None, "<vuoto>")
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let mut s = SortState::default();
        assert_eq!(s, SortState { key: SortKey::StudentNumber, direction: SortDirection::Ascending });
        s.toggle(SortKey::StudentNumber);
        assert_eq!(s.direction, SortDirection::Descending);
        s.toggle(SortKey::StudentNumber);
        assert_eq!(s.direction, SortDirection::Ascending);

        s.toggle(SortKey::StudentNumber);
        s.toggle(SortKey::StudentSurname);
        assert_eq!(s, SortState { key: SortKey::StudentSurname, direction: SortDirection::Ascending });
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Ascending));
        assert_eq!(" DESC ".parse::<SortDirection>(), Ok(SortDirection::Descending));
        assert!("down".parse::<SortDirection>().is_err());
    }

    #[test]
    fn mixed_values_compare_as_text() {
        assert_eq!(compare_values(&SortValue::Number(9), &SortValue::Number(10)), Ordering::Less);
        assert_eq!(
            compare_values(&SortValue::Number(9), &SortValue::Text("10".into())),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&SortValue::Text("Rossi".into()), &SortValue::Text("rossi".into())),
            Ordering::Equal
        );
    }

    #[test]
    fn equal_ranks_fall_back_to_student_number() {
        let ctx = ctx();
        let list = regs(json!([
            { "student": { "number": 10 }, "result": { "id": 3, "value": "18" } },
            { "student": { "number": 3 }, "result": { "id": 3, "value": "18" } }
        ]));
        let state = SortState::new(SortKey::Result);
        assert_eq!(numbers(&sort_registrations(&list, &state, &ctx)), vec![3, 10]);

        let reversed: Vec<Registration> = list.iter().rev().cloned().collect();
        assert_eq!(numbers(&sort_registrations(&reversed, &state, &ctx)), vec![3, 10]);

        // Tie-break is not direction-adjusted.
        let desc = SortState { key: SortKey::Result, direction: SortDirection::Descending };
        assert_eq!(numbers(&sort_registrations(&list, &desc, &ctx)), vec![3, 10]);
    }

    #[test]
    fn result_column_orders_empty_ranked_unranked() {
        let ctx = ctx();
        let list = regs(json!([
            { "student": { "number": 1 }, "result": { "id": 77, "value": "??" } },
            { "student": { "number": 2 }, "result": { "id": 4, "value": "30" } },
            { "student": { "number": 3 }, "result": { "id": 2, "value": "<vuoto>" } },
            { "student": { "number": 4 }, "result": { "id": 1, "value": "absent" } },
            { "student": { "number": 5 } }
        ]));
        let asc = sort_registrations(&list, &SortState::new(SortKey::Result), &ctx);
        assert_eq!(numbers(&asc), vec![3, 5, 4, 2, 1]);
    }

    #[test]
    fn text_columns_ignore_case_and_accents() {
        let ctx = ctx();
        let list = regs(json!([
            { "student": { "number": 1, "surname": "zanetti" } },
            { "student": { "number": 2, "surname": "Érdi" } },
            { "student": { "number": 3, "surname": "Bianchi" } },
            { "student": { "number": 4, "surname": "erdi" } }
        ]));
        let sorted = sort_registrations(&list, &SortState::new(SortKey::StudentSurname), &ctx);
        assert_eq!(numbers(&sorted), vec![3, 2, 4, 1]);
    }

    #[test]
    fn stroked_letters_sort_with_their_base_letter() {
        let ctx = ctx();
        let list = regs(json!([
            { "student": { "number": 1, "surname": "Zanetti" } },
            { "student": { "number": 2, "surname": "Łukasz" } },
            { "student": { "number": 3, "surname": "Marco" } },
            { "student": { "number": 4, "surname": "Øyen" } }
        ]));
        let sorted = sort_registrations(&list, &SortState::new(SortKey::StudentSurname), &ctx);
        assert_eq!(numbers(&sorted), vec![2, 3, 4, 1]);
    }

    #[test]
    fn pending_keeps_first_status_rows_by_student_number() {
        let ctx = ctx();
        let list = regs(json!([
            { "student": { "number": 30 }, "status": "Not Entered" },
            { "student": { "number": 10 }, "status": "entered" },
            { "student": { "number": 20 }, "status": " not entered " },
            { "student": { "number": 5 }, "status": "published" },
            { "student": { "number": 1 } }
        ]));
        assert_eq!(pending_order(&list, &ctx), vec![2, 0]);

        let italian = SortingContext::new(&[], Some(&["non inserito", "inserito"][..]), "<vuoto>");
        let list = regs(json!([
            { "student": { "number": 2 }, "status": "inserito" },
            { "student": { "number": 1 }, "status": "Non inserito" }
        ]));
        assert_eq!(pending_order(&list, &italian), vec![1]);
        assert!(pending_order(&[], &italian).is_empty());
    }

    #[test]
    fn descending_is_reverse_of_ascending_for_unique_values() {
        let ctx = ctx();
        let list = regs(json!([
            { "student": { "number": 30, "surname": "Verdi", "name": "Luca", "email": "l@x.it",
                           "major": { "name": "Math", "degreeLevel": { "name": "BSc" } } },
              "result": { "id": 2, "value": "failed" }, "status": "published" },
            { "student": { "number": 10, "surname": "Bianchi", "name": "Anna", "email": "a@x.it",
                           "major": { "name": "Physics", "degreeLevel": { "name": "MSc" } } },
              "result": { "id": 4, "value": "30" }, "status": "not entered" },
            { "student": { "number": 20, "surname": "Neri", "name": "Carlo", "email": "c@x.it",
                           "major": { "name": "Chemistry", "degreeLevel": { "name": "PhD" } } },
              "result": { "id": 3, "value": "18" }, "status": "recorded" }
        ]));
        for key in SortKey::ALL {
            let mut asc = sort_registrations(&list, &SortState::new(key), &ctx);
            asc.reverse();
            let desc = sort_registrations(
                &list,
                &SortState { key, direction: SortDirection::Descending },
                &ctx,
            );
            assert_eq!(numbers(&asc), numbers(&desc), "key {key}");
        }
    }

    #[test]
    fn ties_without_tie_break_keep_input_order() {
        let items = vec![("b", 1_i64), ("a", 1), ("c", 0)];
        let state = SortState::new(SortKey::StudentNumber);
        let sorted = sort_by_spec(&items, &state, |item, _| SortValue::Number(item.1), None);
        assert_eq!(sorted.iter().map(|i| i.0).collect::<Vec<_>>(), vec!["c", "b", "a"]);
    }

    #[test]
    fn empty_input_sorts_to_empty() {
        let ctx = ctx();
        assert!(sort_registrations(&[], &SortState::default(), &ctx).is_empty());
    }

    #[test]
    fn input_is_not_reordered() {
        let ctx = ctx();
        let list = regs(json!([{ "student": { "number": 2 } }, { "student": { "number": 1 } }]));
        let before = list.clone();
        let _ = sort_registrations(&list, &SortState::default(), &ctx);
        assert_eq!(list, before);
    }
}
