//! Base-strength string comparison: letters compare by their base form, so
//! case and accents never change the order ("Èrica" == "erica").

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letters with no canonical decomposition that still share a base letter
/// (`ł` is an `l`, `ß` is `ss`). Expects lowercase input.
fn fold(c: char) -> impl Iterator<Item = char> {
    let (first, second) = match c {
        'ł' | 'ŀ' => ('l', None),
        'ø' => ('o', None),
        'đ' | 'ð' => ('d', None),
        'ħ' => ('h', None),
        'ı' => ('i', None),
        'ŧ' => ('t', None),
        'ĸ' => ('k', None),
        'ŋ' => ('n', None),
        'ƒ' => ('f', None),
        'æ' => ('a', Some('e')),
        'œ' => ('o', Some('e')),
        'ß' => ('s', Some('s')),
        'þ' => ('t', Some('h')),
        _ => (c, None),
    };
    std::iter::once(first).chain(second)
}

fn base_chars(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .flat_map(fold)
}

pub fn compare_base(a: &str, b: &str) -> Ordering {
    base_chars(a).cmp(base_chars(b))
}
