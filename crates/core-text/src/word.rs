//! Word-boundary classifier backing Alt+Arrow motion, word deletion and
//! double-click selection.
//!
//! Characters fall into three classes: whitespace, hard punctuation (a fixed
//! operator/delimiter set) and names (everything else). Consumption walks a
//! maximal run of the class adjacent to the starting offset. Offsets and
//! returned counts are measured in `char`s.

/// Characters that always terminate a name run.
const HARD_PUNCTUATION: &[char] = &[
    ':', ';', ',', '.', '{', '}', '+', '-', '=', '/', '@', '#', '$', '%', '^', '&', '|', '*', '(',
    ')', '!', '?', '<', '>', '~', '[', ']', '\\', '"', '\'',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Punctuation,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

pub fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if HARD_PUNCTUATION.contains(&c) {
        CharClass::Punctuation
    } else {
        CharClass::Name
    }
}

/// Chars to consume moving right from `index`: skips a whitespace run and then one token.
pub fn consume_forward(text: &str, index: usize) -> usize {
    consume_direction(text, index, Direction::Forward, true)
}

/// Chars to consume moving left from `index`: skips a whitespace run and then one token.
pub fn consume_backward(text: &str, index: usize) -> usize {
    consume_direction(text, index, Direction::Backward, true)
}

/// Count of chars in the run adjacent to `index` in `direction`.
///
/// With `include_initial_class` set, a leading whitespace run is followed by
/// the run of whatever class comes next, so `"   bar"` consumes six chars
/// forward from 0 instead of three. Returns 0 at either edge of `text`.
pub fn consume_direction(
    text: &str,
    index: usize,
    direction: Direction,
    include_initial_class: bool,
) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let index = index.min(chars.len());
    let first = run_length(&chars, index, direction);
    if first == 0 || !include_initial_class {
        return first;
    }
    let adjacent = match direction {
        Direction::Forward => chars[index],
        Direction::Backward => chars[index - 1],
    };
    if classify(adjacent) != CharClass::Whitespace {
        return first;
    }
    let next = match direction {
        Direction::Forward => index + first,
        Direction::Backward => index - first,
    };
    first + run_length(&chars, next, direction)
}

fn run_length(chars: &[char], index: usize, direction: Direction) -> usize {
    match direction {
        Direction::Forward => {
            let Some(&head) = chars.get(index) else {
                return 0;
            };
            let class = classify(head);
            chars[index..]
                .iter()
                .take_while(|c| classify(**c) == class)
                .count()
        }
        Direction::Backward => {
            if index == 0 {
                return 0;
            }
            let class = classify(chars[index - 1]);
            chars[..index]
                .iter()
                .rev()
                .take_while(|c| classify(**c) == class)
                .count()
        }
    }
}
