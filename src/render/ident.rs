// Identifier normalization
//
// Maps entity and method names (including operator methods such as `<=>`
// or `[]=`) to identifiers that are safe as XML id attributes and as
// cache file names.
//
// Layout: `<kind>_<part>-<part>`. Inside a part, `::` becomes `.scope`,
// operator tokens become `.` + a fixed word, and any other character that is
// not alphanumeric or `_` becomes `.u` + six hex digits. A part never emits
// `-` (a literal hyphen is the `.minus` word), and `.` never occurs in a
// documented name, so distinct names map to distinct identifiers.

use crate::model::EntityKind;

/// Kind prefix of a normalized identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Class,
    Module,
    ClassMethod,
    InstanceMethod,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Class => "class",
            IdKind::Module => "module",
            IdKind::ClassMethod => "defs",
            IdKind::InstanceMethod => "def",
        }
    }

    pub fn method(singleton: bool) -> Self {
        if singleton {
            IdKind::ClassMethod
        } else {
            IdKind::InstanceMethod
        }
    }
}

impl From<EntityKind> for IdKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Class => IdKind::Class,
            EntityKind::Module => IdKind::Module,
        }
    }
}

const KIND_SEPARATOR: char = '_';
const PART_SEPARATOR: char = '-';
const WORD_MARK: char = '.';
const SCOPE_WORD: &str = "scope";
const LONGEST_OPERATOR: usize = 3;

/// Readable word for a reserved operator token
fn operator_word(token: &str) -> Option<&'static str> {
    let word = match token {
        "!" => "bang",
        "%" => "percent",
        "&" => "and",
        "*" => "times",
        "**" => "times2",
        "+" => "plus",
        "-" => "minus",
        "/" => "div",
        "<" => "lt",
        "<=" => "lte",
        "<=>" => "spaceship",
        "<<" => "lt2",
        "==" => "equals2",
        "===" => "equals3",
        "=~" => "equalstilde",
        ">" => "gt",
        ">=" => "ge",
        ">>" => "gt2",
        "+@" => "unary_plus",
        "-@" => "unary_minus",
        "[]" => "idx",
        "[]=" => "idx_equals",
        "^" => "carat",
        "|" => "or",
        "~" => "tilde",
        "=" => "eq",
        "?" => "eh",
        "`" => "backtick",
        _ => return None,
    };
    Some(word)
}

/// Longest reserved token at the start of `input`, with its byte length
fn match_operator(input: &str) -> Option<(usize, &'static str)> {
    (1..=LONGEST_OPERATOR.min(input.len()))
        .rev()
        .filter(|&len| input.is_char_boundary(len))
        .find_map(|len| operator_word(&input[..len]).map(|word| (len, word)))
}

fn push_part(out: &mut String, part: &str) {
    let mut rest = part;
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("::") {
            out.push(WORD_MARK);
            out.push_str(SCOPE_WORD);
            rest = &rest[2..];
            continue;
        }

        if let Some((len, word)) = match_operator(rest) {
            out.push(WORD_MARK);
            out.push_str(word);
            rest = &rest[len..];
            continue;
        }

        match c {
            c if c.is_alphanumeric() || c == '_' => out.push(c),
            c => out.push_str(&format!("{}u{:06x}", WORD_MARK, c as u32)),
        }
        rest = &rest[c.len_utf8()..];
    }
}

/// Build the identifier for `kind` and the given name parts
pub fn normalize(kind: IdKind, parts: &[&str]) -> String {
    let mut out = String::from(kind.prefix());
    out.push(KIND_SEPARATOR);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(PART_SEPARATOR);
        }
        push_part(&mut out, part);
    }
    out
}

/// Cache key for an entity, independent of whether it is a class or module
pub fn entry_key(full_name: &str) -> String {
    let mut out = String::new();
    push_part(&mut out, full_name);
    out
}
