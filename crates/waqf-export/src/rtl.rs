//! Arabic text preparation for renderers without a shaping engine.
//!
//! PDF text is laid out glyph by glyph in visual order, so Arabic must be
//! converted to contextual presentation forms (U+FE70..U+FEFF) while still in
//! logical order, then reordered with the Unicode bidirectional algorithm.

use unicode_bidi::{BidiInfo, Level};
use waqf_core::TextDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joining {
    /// Connects on both sides (four forms).
    Dual,
    /// Connects only to the preceding letter (isolated and final forms).
    Right,
    /// Never connects.
    NonJoining,
    /// Tatweel: connects on both sides, has no forms of its own.
    Causing,
}

/// First presentation form (isolated) and joining type of an Arabic letter.
/// Forms follow in the order isolated, final, initial, medial.
fn letter(c: char) -> Option<(u32, Joining)> {
    use Joining::*;
    let entry = match c {
        '\u{0621}' => (0xFE80, NonJoining),
        '\u{0622}' => (0xFE81, Right),
        '\u{0623}' => (0xFE83, Right),
        '\u{0624}' => (0xFE85, Right),
        '\u{0625}' => (0xFE87, Right),
        '\u{0626}' => (0xFE89, Dual),
        '\u{0627}' => (0xFE8D, Right),
        '\u{0628}' => (0xFE8F, Dual),
        '\u{0629}' => (0xFE93, Right),
        '\u{062A}' => (0xFE95, Dual),
        '\u{062B}' => (0xFE99, Dual),
        '\u{062C}' => (0xFE9D, Dual),
        '\u{062D}' => (0xFEA1, Dual),
        '\u{062E}' => (0xFEA5, Dual),
        '\u{062F}' => (0xFEA9, Right),
        '\u{0630}' => (0xFEAB, Right),
        '\u{0631}' => (0xFEAD, Right),
        '\u{0632}' => (0xFEAF, Right),
        '\u{0633}' => (0xFEB1, Dual),
        '\u{0634}' => (0xFEB5, Dual),
        '\u{0635}' => (0xFEB9, Dual),
        '\u{0636}' => (0xFEBD, Dual),
        '\u{0637}' => (0xFEC1, Dual),
        '\u{0638}' => (0xFEC5, Dual),
        '\u{0639}' => (0xFEC9, Dual),
        '\u{063A}' => (0xFECD, Dual),
        '\u{0640}' => (0x0640, Causing),
        '\u{0641}' => (0xFED1, Dual),
        '\u{0642}' => (0xFED5, Dual),
        '\u{0643}' => (0xFED9, Dual),
        '\u{0644}' => (0xFEDD, Dual),
        '\u{0645}' => (0xFEE1, Dual),
        '\u{0646}' => (0xFEE5, Dual),
        '\u{0647}' => (0xFEE9, Dual),
        '\u{0648}' => (0xFEED, Right),
        '\u{0649}' => (0xFEEF, Right),
        '\u{064A}' => (0xFEF1, Dual),
        _ => return None,
    };
    Some(entry)
}

/// Harakat and superscript alef sit on a letter without breaking joins.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

fn joins_forward(c: char) -> bool {
    matches!(letter(c), Some((_, Joining::Dual | Joining::Causing)))
}

fn joins_backward(c: char) -> bool {
    matches!(
        letter(c),
        Some((_, Joining::Dual | Joining::Right | Joining::Causing))
    )
}

/// Lam-alef ligature, isolated form. The final form follows it.
fn lam_alef(alef: char) -> Option<u32> {
    match alef {
        '\u{0622}' => Some(0xFEF5),
        '\u{0623}' => Some(0xFEF7),
        '\u{0625}' => Some(0xFEF9),
        '\u{0627}' => Some(0xFEFB),
        _ => None,
    }
}

const LAM: char = '\u{0644}';

fn prev_joining(chars: &[char], i: usize) -> Option<char> {
    chars[..i].iter().rev().copied().find(|c| !is_transparent(*c))
}

fn next_joining(chars: &[char], i: usize) -> Option<(usize, char)> {
    chars
        .iter()
        .copied()
        .enumerate()
        .skip(i + 1)
        .find(|(_, c)| !is_transparent(*c))
}

/// Replace Arabic letters with their contextual presentation forms.
/// Text is left in logical order.
pub fn shape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let Some((base, joining)) = letter(c) else {
            out.push(c);
            i += 1;
            continue;
        };
        let joined_before = prev_joining(&chars, i).is_some_and(joins_forward);

        if c == LAM {
            let ligature = next_joining(&chars, i).and_then(|(j, a)| lam_alef(a).map(|lig| (j, lig)));
            if let Some((j, lig)) = ligature {
                let form = if joined_before { lig + 1 } else { lig };
                out.extend(char::from_u32(form));
                // Marks between lam and alef stay on the ligature.
                out.extend(&chars[i + 1..j]);
                i = j + 1;
                continue;
            }
        }

        let joined_after = next_joining(&chars, i).is_some_and(|(_, n)| joins_backward(n));
        let offset = match joining {
            Joining::Causing | Joining::NonJoining => 0,
            Joining::Right => u32::from(joined_before),
            Joining::Dual => match (joined_before, joined_after) {
                (false, false) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (true, true) => 3,
            },
        };
        if joining == Joining::Causing {
            out.push(c);
        } else {
            out.extend(char::from_u32(base + offset));
        }
        i += 1;
    }
    out
}

/// Reorder a single line from logical to visual (left-to-right) order.
pub fn reorder(text: &str, direction: TextDirection) -> String {
    let level = match direction {
        TextDirection::Rtl => Level::rtl(),
        TextDirection::Ltr => Level::ltr(),
    };
    let info = BidiInfo::new(text, Some(level));
    info.paragraphs
        .iter()
        .map(|para| info.reorder_line(para, para.range.clone()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shape then reorder: ready to draw left to right.
pub fn visual(text: &str, direction: TextDirection) -> String {
    if direction == TextDirection::Ltr && !contains_arabic(text) {
        return text.to_string();
    }
    reorder(&shape(text), direction)
}

pub fn contains_arabic(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{0600}'..='\u{06FF}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}'))
}
