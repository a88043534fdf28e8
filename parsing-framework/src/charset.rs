use std::fmt;

/// Predefined single-character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Space,
    Letter,
    Digit,
    HexDigit,
    Punctuation,
    IdStart,
    IdCont,
}

impl CharClass {
    pub fn matches(self, ch: char) -> bool {
        match self {
            CharClass::Space => ch.is_whitespace(),
            CharClass::Letter => ch.is_alphabetic(),
            CharClass::Digit => ch.is_ascii_digit(),
            CharClass::HexDigit => ch.is_ascii_hexdigit(),
            CharClass::Punctuation => ch.is_ascii_punctuation(),
            CharClass::IdStart => ch.is_alphabetic() || ch == '_',
            CharClass::IdCont => is_identifier_continuation(ch),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharClass::Space => "space",
            CharClass::Letter => "letter",
            CharClass::Digit => "digit",
            CharClass::HexDigit => "hexdigit",
            CharClass::Punctuation => "punctuation",
            CharClass::IdStart => "idstart",
            CharClass::IdCont => "idcont",
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Characters that may continue an identifier; a keyword followed by one of
/// these is a prefix of a longer identifier.
pub fn is_identifier_continuation(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// A set of code points built from a set expression such as `a-zA-Z_`.
///
/// `x-y` denotes an inclusive range; a `-` at either end of the expression
/// is literal. A backslash escapes the next character, with `\n`, `\r`,
/// `\t` and `\0` standing for the usual control characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    source: String,
    ranges: Vec<(char, char)>,
    inverse: bool,
}

impl CharSet {
    pub fn new(source: &str) -> Self {
        Self::build(source, false)
    }

    /// A set matching every code point not described by `source`.
    pub fn inverse(source: &str) -> Self {
        Self::build(source, true)
    }

    fn build(source: &str, inverse: bool) -> Self {
        let units = unescape(source);
        let mut ranges = Vec::new();
        let mut index = 0;
        while index < units.len() {
            let (first, _) = units[index];
            let is_range = matches!(units.get(index + 1), Some(&('-', false))) && index + 2 < units.len();
            if is_range {
                let (last, _) = units[index + 2];
                ranges.push((first.min(last), first.max(last)));
                index += 3;
            } else {
                ranges.push((first, first));
                index += 1;
            }
        }
        Self {
            source: source.to_string(),
            ranges,
            inverse,
        }
    }

    pub fn contains(&self, ch: char) -> bool {
        let inside = self.ranges.iter().any(|&(lo, hi)| lo <= ch && ch <= hi);
        inside != self.inverse
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "[^{}]", self.source)
        } else {
            write!(f, "[{}]", self.source)
        }
    }
}

/// Splits a set expression into code points, flagging escaped ones.
fn unescape(source: &str) -> Vec<(char, bool)> {
    let mut units = Vec::new();
    let mut chars = source.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            units.push((ch, false));
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('0') => '\0',
            Some(other) => other,
            None => '\\',
        };
        units.push((escaped, true));
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_and_singles() {
        let set = CharSet::new("a-zA-Z_");
        assert!(set.contains('q'));
        assert!(set.contains('Q'));
        assert!(set.contains('_'));
        assert!(!set.contains('-'));
        assert!(!set.contains('0'));
    }

    #[test]
    fn test_trailing_dash_is_literal() {
        let set = CharSet::new("+-");
        assert!(set.contains('+'));
        assert!(set.contains('-'));
        assert!(!set.contains(','));
    }

    #[test]
    fn test_escapes() {
        let set = CharSet::new("\\]\\-\\n");
        assert!(set.contains(']'));
        assert!(set.contains('-'));
        assert!(set.contains('\n'));
        assert_eq!(set.ranges().len(), 3);
    }

    #[test]
    fn test_inverse_set() {
        let set = CharSet::inverse("<&\"");
        assert!(set.contains('a'));
        assert!(!set.contains('<'));
        assert_eq!(set.to_string(), "[^<&\"]");
    }

    #[test]
    fn test_char_classes() {
        assert!(CharClass::IdStart.matches('_'));
        assert!(!CharClass::IdStart.matches('1'));
        assert!(CharClass::IdCont.matches('1'));
        assert!(CharClass::HexDigit.matches('F'));
        assert!(CharClass::Space.matches('\t'));
        assert!(CharClass::Punctuation.matches(';'));
        assert!(CharClass::Letter.matches('ä'));
    }
}
