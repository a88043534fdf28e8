use crate::charset::{is_identifier_continuation, CharClass, CharSet};
use crate::context::ParseContext;
use crate::error::{ExpectationFailure, GrammarError, ParsingError, ParsingException};
use crate::frame::AttributeFrame;
use crate::rule::{ActionContext, ActionFn, ArgumentFn};
use indexmap::IndexMap;
use parsing_common::{Match, RuleId};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A node of a grammar's parser tree.
///
/// Trees are built with the constructor functions and chaining methods
/// below, referring to other rules by name. Linking resolves those names
/// and the named actions; afterwards the tree is never mutated again.
pub enum Parser<V> {
    /// Always matches, consuming nothing
    Empty,
    /// Any single code point
    AnyChar,
    /// Matches only at the end of the input
    End,
    Char(char),
    Literal(Vec<char>),
    Class(CharClass),
    Set(CharSet),
    Range(char, char),
    Keyword(KeywordParser),
    KeywordList(KeywordListParser<V>),
    Sequence(Box<Parser<V>>, Box<Parser<V>>),
    Alternative(Box<Parser<V>>, Box<Parser<V>>),
    Optional(Box<Parser<V>>),
    KleeneStar(Box<Parser<V>>),
    Positive(Box<Parser<V>>),
    Difference(Box<Parser<V>>, Box<Parser<V>>),
    ExclusiveOr(Box<Parser<V>>, Box<Parser<V>>),
    Intersection(Box<Parser<V>>, Box<Parser<V>>),
    /// `A (B A)*`
    List(Box<Parser<V>>, Box<Parser<V>>),
    Grouping(Box<Parser<V>>),
    /// Suppresses the skip rule inside its child
    Token(Box<Parser<V>>),
    /// Turns a failure of its child into a fatal `ExpectationFailure`
    Expectation(Box<Parser<V>>),
    Action(ActionParser<V>),
    Nonterminal(NonterminalParser<V>),
}

/// A rule referenced by name, resolved during linking.
#[derive(Debug, Clone)]
pub struct RuleRef {
    name: String,
    id: Option<RuleId>,
}

impl RuleRef {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<RuleId> {
        self.id
    }

    fn resolved(&self) -> Result<RuleId, ParsingError> {
        self.id.ok_or_else(|| ParsingError::Unlinked {
            name: self.name.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct KeywordParser {
    text: Vec<char>,
    continuation: Option<RuleRef>,
}

impl KeywordParser {
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn continuation(&self) -> Option<&RuleRef> {
        self.continuation.as_ref()
    }
}

pub struct KeywordListParser<V> {
    selector: Box<Parser<V>>,
    words: BTreeSet<String>,
}

impl<V> KeywordListParser<V> {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

pub struct ActionParser<V> {
    name: String,
    child: Box<Parser<V>>,
    callback: Option<ActionFn<V>>,
}

impl<V> ActionParser<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_linked(&self) -> bool {
        self.callback.is_some()
    }
}

pub struct NonterminalParser<V> {
    rule: RuleRef,
    instance: Arc<str>,
    args: Vec<ArgumentFn<V>>,
}

impl<V> NonterminalParser<V> {
    pub fn rule(&self) -> &RuleRef {
        &self.rule
    }

    /// The frame slot the callee's value is stored under.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

impl<V> Parser<V> {
    /// Matches the empty string.
    pub fn empty() -> Self {
        Parser::Empty
    }

    /// Matches any single code point.
    pub fn any_char() -> Self {
        Parser::AnyChar
    }

    /// Matches only at the end of the input.
    pub fn end() -> Self {
        Parser::End
    }

    /// Matches the code point `ch`.
    pub fn char(ch: char) -> Self {
        Parser::Char(ch)
    }

    /// Matches `text` exactly.
    pub fn literal(text: &str) -> Self {
        Parser::Literal(text.chars().collect())
    }

    /// Matches `text` unless it is immediately followed by an identifier
    /// character.
    pub fn keyword(text: &str) -> Self {
        Parser::Keyword(KeywordParser {
            text: text.chars().collect(),
            continuation: None,
        })
    }

    /// Matches `text` unless the rule `continuation` matches right after it.
    pub fn keyword_with_continuation(text: &str, continuation: &str) -> Self {
        Parser::Keyword(KeywordParser {
            text: text.chars().collect(),
            continuation: Some(RuleRef::new(continuation)),
        })
    }

    /// Matches `selector` and succeeds only if the matched text is one of
    /// `words`.
    pub fn keyword_list(selector: Parser<V>, words: &[&str]) -> Self {
        Parser::KeywordList(KeywordListParser {
            selector: Box::new(selector),
            words: words.iter().map(|word| word.to_string()).collect(),
        })
    }

    /// Matches one code point of `class`.
    pub fn class(class: CharClass) -> Self {
        Parser::Class(class)
    }

    /// Matches one white-space code point.
    pub fn space() -> Self {
        Parser::Class(CharClass::Space)
    }

    /// Matches one alphabetic code point.
    pub fn letter() -> Self {
        Parser::Class(CharClass::Letter)
    }

    /// Matches one ASCII digit.
    pub fn digit() -> Self {
        Parser::Class(CharClass::Digit)
    }

    /// Matches one hexadecimal digit.
    pub fn hex_digit() -> Self {
        Parser::Class(CharClass::HexDigit)
    }

    /// Matches one ASCII punctuation character.
    pub fn punctuation() -> Self {
        Parser::Class(CharClass::Punctuation)
    }

    /// Matches a code point that can start an identifier.
    pub fn id_start() -> Self {
        Parser::Class(CharClass::IdStart)
    }

    /// Matches a code point that can continue an identifier.
    pub fn id_cont() -> Self {
        Parser::Class(CharClass::IdCont)
    }

    /// One code point from a set expression such as `a-zA-Z_`.
    pub fn set(source: &str) -> Self {
        Parser::Set(CharSet::new(source))
    }

    /// One code point outside a set expression.
    pub fn inverse_set(source: &str) -> Self {
        Parser::Set(CharSet::inverse(source))
    }

    /// Matches one code point in `first..=last`.
    pub fn range(first: char, last: char) -> Self {
        Parser::Range(first, last)
    }

    /// Calls `rule`, storing its value under the rule's own name.
    pub fn nonterminal(rule: &str) -> Self {
        Self::call(rule, rule, Vec::new())
    }

    /// Calls `rule`, storing its value under `instance`.
    pub fn nonterminal_as(rule: &str, instance: &str) -> Self {
        Self::call(rule, instance, Vec::new())
    }

    /// Calls `rule` with one argument per inherited attribute it declares.
    pub fn call(rule: &str, instance: &str, args: Vec<ArgumentFn<V>>) -> Self {
        Parser::Nonterminal(NonterminalParser {
            rule: RuleRef::new(rule),
            instance: Arc::from(instance),
            args,
        })
    }

    /// Chains `parts` into a sequence; an empty iterator gives `Empty`.
    pub fn sequence(parts: impl IntoIterator<Item = Parser<V>>) -> Self {
        parts
            .into_iter()
            .reduce(Parser::then)
            .unwrap_or(Parser::Empty)
    }

    /// Ordered choice between `parts`; an empty iterator gives `Empty`.
    pub fn choice(parts: impl IntoIterator<Item = Parser<V>>) -> Self {
        parts
            .into_iter()
            .reduce(Parser::or)
            .unwrap_or(Parser::Empty)
    }

    /// `self` followed by `next`, with the skip rule applied in between.
    pub fn then(self, next: Parser<V>) -> Self {
        Parser::Sequence(Box::new(self), Box::new(next))
    }

    /// Ordered choice: `other` is tried only when `self` fails.
    pub fn or(self, other: Parser<V>) -> Self {
        Parser::Alternative(Box::new(self), Box::new(other))
    }

    /// Zero or one `self`.
    pub fn opt(self) -> Self {
        Parser::Optional(Box::new(self))
    }

    /// Zero or more `self`.
    pub fn star(self) -> Self {
        Parser::KleeneStar(Box::new(self))
    }

    /// One or more `self`.
    pub fn plus(self) -> Self {
        Parser::Positive(Box::new(self))
    }

    /// `self`, unless `excluded` matches at least as much.
    pub fn except(self, excluded: Parser<V>) -> Self {
        Parser::Difference(Box::new(self), Box::new(excluded))
    }

    /// Exactly one of `self` and `other`.
    pub fn xor(self, other: Parser<V>) -> Self {
        Parser::ExclusiveOr(Box::new(self), Box::new(other))
    }

    /// `self`, if `other` matches the same text.
    pub fn and(self, other: Parser<V>) -> Self {
        Parser::Intersection(Box::new(self), Box::new(other))
    }

    /// One or more `self` separated by `separator`.
    pub fn list(self, separator: Parser<V>) -> Self {
        Parser::List(Box::new(self), Box::new(separator))
    }

    /// Parenthesizes `self` when the tree is displayed.
    pub fn group(self) -> Self {
        Parser::Grouping(Box::new(self))
    }

    /// Suppresses the skip rule inside `self`.
    pub fn token(self) -> Self {
        Parser::Token(Box::new(self))
    }

    /// Makes a failure of `self` abort the parse.
    pub fn expect(self) -> Self {
        Parser::Expectation(Box::new(self))
    }

    /// Runs the enclosing rule's action `name` whenever `self` matches.
    pub fn action(self, name: &str) -> Self {
        Parser::Action(ActionParser {
            name: name.to_string(),
            child: Box::new(self),
            callback: None,
        })
    }

    /// Resolves rule names and actions in this tree. Linking an already
    /// linked tree resolves to the same targets.
    pub(crate) fn link(&mut self, scope: &LinkScope<'_, V>) -> Result<(), GrammarError> {
        match self {
            Parser::Keyword(keyword) => {
                if let Some(continuation) = &mut keyword.continuation {
                    let target = scope.resolve(&continuation.name)?;
                    scope.check_arguments(&continuation.name, target, 0)?;
                    continuation.id = Some(target.id);
                }
            }
            Parser::KeywordList(list) => list.selector.link(scope)?,
            Parser::Sequence(left, right)
            | Parser::Alternative(left, right)
            | Parser::Difference(left, right)
            | Parser::ExclusiveOr(left, right)
            | Parser::Intersection(left, right)
            | Parser::List(left, right) => {
                left.link(scope)?;
                right.link(scope)?;
            }
            Parser::Optional(child)
            | Parser::KleeneStar(child)
            | Parser::Positive(child)
            | Parser::Grouping(child)
            | Parser::Token(child)
            | Parser::Expectation(child) => child.link(scope)?,
            Parser::Action(action) => {
                action.callback = Some(scope.action(&action.name)?);
                action.child.link(scope)?;
            }
            Parser::Nonterminal(nonterminal) => {
                let target = scope.resolve(&nonterminal.rule.name)?;
                scope.check_arguments(&nonterminal.rule.name, target, nonterminal.args.len())?;
                nonterminal.rule.id = Some(target.id);
            }
            Parser::Empty
            | Parser::AnyChar
            | Parser::End
            | Parser::Char(_)
            | Parser::Literal(_)
            | Parser::Class(_)
            | Parser::Set(_)
            | Parser::Range(_, _) => {}
        }
        Ok(())
    }

    /// Evaluates this parser at the scanner's position.
    ///
    /// A soft failure leaves the scanner where it was. A hit's length is the
    /// number of code points the scanner advanced.
    pub(crate) fn parse(
        &self,
        ctx: &mut ParseContext<'_, V>,
        frame: &mut AttributeFrame<V>,
    ) -> Result<Match, ParsingError> {
        match self {
            Parser::Empty => Ok(Match::empty()),
            Parser::AnyChar => Ok(ctx.scan_one(|_| true)),
            Parser::End => Ok(if ctx.scanner.is_eof() {
                Match::empty()
            } else {
                Match::nothing()
            }),
            Parser::Char(expected) => Ok(ctx.scan_one(|ch| ch == *expected)),
            Parser::Literal(text) => {
                if ctx.scanner.cursor().starts_with(text) {
                    ctx.scanner.cursor_mut().advance_by(text.len());
                    Ok(Match::hit(text.len()))
                } else {
                    Ok(Match::nothing())
                }
            }
            Parser::Class(class) => Ok(ctx.scan_one(|ch| class.matches(ch))),
            Parser::Set(set) => Ok(ctx.scan_one(|ch| set.contains(ch))),
            Parser::Range(first, last) => Ok(ctx.scan_one(|ch| *first <= ch && ch <= *last)),
            Parser::Keyword(keyword) => parse_keyword(keyword, ctx),
            Parser::KeywordList(list) => parse_keyword_list(list, ctx, frame),
            Parser::Sequence(left, right) => {
                let start = ctx.scanner.checkpoint();
                if left.parse(ctx, frame)?.is_hit() {
                    ctx.skip()?;
                    if right.parse(ctx, frame)?.is_hit() {
                        return Ok(ctx.matched_since(start));
                    }
                }
                ctx.scanner.restore(start);
                Ok(Match::nothing())
            }
            Parser::Alternative(left, right) => {
                let start = ctx.scanner.checkpoint();
                let matched = left.parse(ctx, frame)?;
                if matched.is_hit() {
                    return Ok(matched);
                }
                ctx.scanner.restore(start);
                let matched = right.parse(ctx, frame)?;
                if !matched.is_hit() {
                    ctx.scanner.restore(start);
                }
                Ok(matched)
            }
            Parser::Optional(child) => {
                let start = ctx.scanner.checkpoint();
                let matched = child.parse(ctx, frame)?;
                if matched.is_hit() {
                    Ok(matched)
                } else {
                    ctx.scanner.restore(start);
                    Ok(Match::empty())
                }
            }
            Parser::KleeneStar(child) => repeat(child, 0, ctx, frame),
            Parser::Positive(child) => repeat(child, 1, ctx, frame),
            Parser::Difference(left, right) => parse_difference(left, right, ctx, frame),
            Parser::ExclusiveOr(left, right) => parse_exclusive_or(left, right, ctx, frame),
            Parser::Intersection(left, right) => parse_intersection(left, right, ctx, frame),
            Parser::List(element, separator) => parse_list(element, separator, ctx, frame),
            Parser::Grouping(child) => child.parse(ctx, frame),
            Parser::Token(child) => {
                ctx.scanner.begin_token();
                let result = child.parse(ctx, frame);
                ctx.scanner.end_token();
                result
            }
            Parser::Expectation(child) => parse_expectation(child, ctx, frame),
            Parser::Action(action) => parse_action(action, ctx, frame),
            Parser::Nonterminal(nonterminal) => parse_nonterminal(nonterminal, ctx, frame),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Parser::Alternative(_, _) => 1,
            Parser::Difference(_, _) | Parser::ExclusiveOr(_, _) | Parser::Intersection(_, _) => 2,
            Parser::Sequence(_, _) => 3,
            Parser::List(_, _) => 4,
            Parser::Optional(_)
            | Parser::KleeneStar(_)
            | Parser::Positive(_)
            | Parser::Expectation(_) => 5,
            Parser::Action(action) => action.child.precedence(),
            _ => 6,
        }
    }
}

// Out-of-line arms of `Parser::parse`, whose frame sits on every level of
// rule recursion.

#[inline(never)]
fn parse_keyword_list<V>(
    list: &KeywordListParser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let matched = list.selector.parse(ctx, frame)?;
    if !matched.is_hit() {
        return Ok(matched);
    }
    let text = ctx.scanner.text_from(start).to_string();
    if list.words.contains(&text) {
        Ok(matched)
    } else {
        ctx.scanner.restore(start);
        Ok(Match::nothing())
    }
}

/// `left` unless `right` matches at least as much from the same position.
#[inline(never)]
fn parse_difference<V>(
    left: &Parser<V>,
    right: &Parser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let matched = left.parse(ctx, frame)?;
    if !matched.is_hit() {
        return Ok(matched);
    }
    let end = ctx.scanner.checkpoint();
    ctx.scanner.restore(start);
    let excluded = right.parse(ctx, frame)?.is_hit() && ctx.scanner.offset() >= end.index();
    if excluded {
        ctx.scanner.restore(start);
        Ok(Match::nothing())
    } else {
        ctx.scanner.restore(end);
        Ok(matched)
    }
}

#[inline(never)]
fn parse_exclusive_or<V>(
    left: &Parser<V>,
    right: &Parser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let left_match = left.parse(ctx, frame)?;
    let left_end = ctx.scanner.checkpoint();
    ctx.scanner.restore(start);
    let right_match = right.parse(ctx, frame)?;
    match (left_match.is_hit(), right_match.is_hit()) {
        (true, false) => {
            ctx.scanner.restore(left_end);
            Ok(left_match)
        }
        (false, true) => Ok(right_match),
        _ => {
            ctx.scanner.restore(start);
            Ok(Match::nothing())
        }
    }
}

/// `left`, provided `right` matches exactly the same text.
#[inline(never)]
fn parse_intersection<V>(
    left: &Parser<V>,
    right: &Parser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let left_match = left.parse(ctx, frame)?;
    if !left_match.is_hit() {
        return Ok(left_match);
    }
    let left_end = ctx.scanner.offset();
    ctx.scanner.restore(start);
    let right_match = right.parse(ctx, frame)?;
    if right_match.is_hit() && ctx.scanner.offset() == left_end {
        Ok(left_match)
    } else {
        ctx.scanner.restore(start);
        Ok(Match::nothing())
    }
}

#[inline(never)]
fn parse_list<V>(
    element: &Parser<V>,
    separator: &Parser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    if !element.parse(ctx, frame)?.is_hit() {
        return Ok(Match::nothing());
    }
    loop {
        let iteration = ctx.scanner.checkpoint();
        ctx.skip()?;
        if !separator.parse(ctx, frame)?.is_hit() {
            ctx.scanner.restore(iteration);
            break;
        }
        ctx.skip()?;
        if !element.parse(ctx, frame)?.is_hit() {
            ctx.scanner.restore(iteration);
            break;
        }
        if ctx.scanner.offset() == iteration.index() {
            break;
        }
    }
    Ok(ctx.matched_since(start))
}

#[inline(never)]
fn parse_expectation<V>(
    child: &Parser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let matched = child.parse(ctx, frame)?;
    if matched.is_hit() {
        return Ok(matched);
    }
    let span = ctx.scanner.span_from(start);
    Err(ExpectationFailure::new(child.to_string(), ctx.location(span)).into())
}

/// Runs the action's callback once its child has matched.
#[inline(never)]
fn parse_action<V>(
    action: &ActionParser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let matched = action.child.parse(ctx, frame)?;
    if !matched.is_hit() {
        return Ok(matched);
    }
    let callback = action
        .callback
        .as_ref()
        .ok_or_else(|| ParsingError::Unlinked {
            name: action.name.clone(),
        })?;
    let span = ctx.scanner.span_from(start);
    let mut action_ctx = ActionContext::new(
        frame,
        ctx.scanner.text_from(start),
        span,
        ctx.scanner.shared_file_name(),
    );
    callback(&mut action_ctx);
    let (pass, error) = action_ctx.finish();
    if let Some(message) = error {
        return Err(ParsingException::new(message, ctx.location(span)).into());
    }
    if pass {
        Ok(matched)
    } else {
        ctx.scanner.restore(start);
        Ok(Match::nothing())
    }
}

/// Pushes the call's arguments, runs the callee and stores its value
/// under the call's instance name.
#[inline(never)]
fn parse_nonterminal<V>(
    nonterminal: &NonterminalParser<V>,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let rule = ctx.rule(nonterminal.rule.resolved()?);
    for (index, argument) in nonterminal.args.iter().enumerate() {
        let value = argument(&*frame).ok_or_else(|| ParsingError::MissingArgument {
            rule: rule.full_name().to_string(),
            index,
        })?;
        ctx.stack.push(value);
    }
    let matched = rule.parse(ctx)?;
    if matched.is_hit() && rule.has_value() {
        let value = ctx
            .stack
            .pop()
            .ok_or_else(|| ParsingError::ValueStackUnderflow {
                rule: rule.full_name().to_string(),
            })?;
        frame.set_instance(&nonterminal.instance, value);
    }
    Ok(matched)
}

/// Repeats `child` at least `min` times, applying the skip rule between
/// iterations. An iteration that consumes nothing ends the loop.
#[inline(never)]
fn repeat<V>(
    child: &Parser<V>,
    min: usize,
    ctx: &mut ParseContext<'_, V>,
    frame: &mut AttributeFrame<V>,
) -> Result<Match, ParsingError> {
    let start = ctx.scanner.checkpoint();
    let mut count = 0;
    loop {
        let iteration = ctx.scanner.checkpoint();
        if count > 0 {
            ctx.skip()?;
        }
        let before = ctx.scanner.offset();
        let matched = child.parse(ctx, frame)?;
        if !matched.is_hit() || ctx.scanner.offset() == before {
            ctx.scanner.restore(iteration);
            if matched.is_hit() {
                count += 1;
            }
            break;
        }
        count += 1;
    }
    if count < min {
        ctx.scanner.restore(start);
        return Ok(Match::nothing());
    }
    Ok(ctx.matched_since(start))
}

#[inline(never)]
fn parse_keyword<V>(
    keyword: &KeywordParser,
    ctx: &mut ParseContext<'_, V>,
) -> Result<Match, ParsingError> {
    if !ctx.scanner.cursor().starts_with(&keyword.text) {
        return Ok(Match::nothing());
    }
    let start = ctx.scanner.checkpoint();
    ctx.scanner.cursor_mut().advance_by(keyword.text.len());

    let continued = match &keyword.continuation {
        None => ctx.scanner.peek().is_some_and(is_identifier_continuation),
        Some(continuation) => {
            let rule = ctx.rule(continuation.resolved()?);
            let after = ctx.scanner.checkpoint();
            let mark = ctx.stack.len();
            let hit = rule.parse(ctx)?.is_hit();
            ctx.stack.truncate(mark);
            ctx.scanner.restore(after);
            hit
        }
    };

    if continued {
        ctx.scanner.restore(start);
        Ok(Match::nothing())
    } else {
        Ok(Match::hit(keyword.text.len()))
    }
}

/// A rule reference resolved during linking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRule {
    pub(crate) id: RuleId,
    pub(crate) inherited: usize,
}

/// Name resolution for one rule's tree.
pub(crate) struct LinkScope<'a, V> {
    pub(crate) grammar: &'a str,
    pub(crate) rule: &'a str,
    pub(crate) actions: &'a IndexMap<String, ActionFn<V>>,
    pub(crate) resolver: &'a dyn Fn(&str) -> Option<ResolvedRule>,
}

impl<V> LinkScope<'_, V> {
    fn resolve(&self, name: &str) -> Result<ResolvedRule, GrammarError> {
        (self.resolver)(name).ok_or_else(|| GrammarError::RuleNotFound {
            grammar: self.grammar.to_string(),
            rule: self.rule.to_string(),
            name: name.to_string(),
        })
    }

    /// A call passes exactly one argument per inherited attribute; keyword
    /// continuations pass none.
    fn check_arguments(&self, name: &str, target: ResolvedRule, found: usize) -> Result<(), GrammarError> {
        if target.inherited == found {
            return Ok(());
        }
        Err(GrammarError::ArgumentCountMismatch {
            grammar: self.grammar.to_string(),
            rule: self.rule.to_string(),
            name: name.to_string(),
            expected: target.inherited,
            found,
        })
    }

    fn action(&self, name: &str) -> Result<ActionFn<V>, GrammarError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| GrammarError::ActionNotFound {
                grammar: self.grammar.to_string(),
                rule: self.rule.to_string(),
                action: name.to_string(),
            })
    }
}

fn write_child<V>(f: &mut fmt::Formatter<'_>, child: &Parser<V>, min: u8) -> fmt::Result {
    if child.precedence() < min {
        write!(f, "({child})")
    } else {
        write!(f, "{child}")
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &[char], quote: char) -> fmt::Result {
    write!(f, "{quote}")?;
    for ch in text {
        if *ch == quote {
            write!(f, "\\{ch}")?;
        } else {
            write!(f, "{}", ch.escape_debug())?;
        }
    }
    write!(f, "{quote}")
}

/// Grammar notation: `'a' b* ("cd" | [0-9]+)`.
impl<V> fmt::Display for Parser<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parser::Empty => f.write_str("empty"),
            Parser::AnyChar => f.write_str("anychar"),
            Parser::End => f.write_str("end"),
            Parser::Char(ch) => write_quoted(f, &[*ch], '\''),
            Parser::Literal(text) => write_quoted(f, text, '"'),
            Parser::Class(class) => write!(f, "{class}"),
            Parser::Set(set) => write!(f, "{set}"),
            Parser::Range(first, last) => write!(
                f,
                "range('{}', '{}')",
                first.escape_debug(),
                last.escape_debug()
            ),
            Parser::Keyword(keyword) => write_quoted(f, &keyword.text, '"'),
            Parser::KeywordList(list) => {
                let words: Vec<&str> = list.words().collect();
                write!(f, "keyword_list({}, {})", list.selector, words.join(" "))
            }
            Parser::Sequence(left, right) => {
                write_child(f, left, 3)?;
                f.write_str(" ")?;
                write_child(f, right, 3)
            }
            Parser::Alternative(left, right) => {
                write_child(f, left, 1)?;
                f.write_str(" | ")?;
                write_child(f, right, 1)
            }
            Parser::Difference(left, right)
            | Parser::ExclusiveOr(left, right)
            | Parser::Intersection(left, right) => {
                let operator = match self {
                    Parser::Difference(_, _) => " - ",
                    Parser::ExclusiveOr(_, _) => " ^ ",
                    _ => " & ",
                };
                write_child(f, left, 2)?;
                f.write_str(operator)?;
                write_child(f, right, 3)
            }
            Parser::List(element, separator) => {
                write_child(f, element, 5)?;
                f.write_str(" % ")?;
                write_child(f, separator, 5)
            }
            Parser::Optional(child) => {
                write_child(f, child, 6)?;
                f.write_str("?")
            }
            Parser::KleeneStar(child) => {
                write_child(f, child, 6)?;
                f.write_str("*")
            }
            Parser::Positive(child) => {
                write_child(f, child, 6)?;
                f.write_str("+")
            }
            Parser::Expectation(child) => {
                write_child(f, child, 6)?;
                f.write_str("!")
            }
            Parser::Grouping(child) => write!(f, "({child})"),
            Parser::Token(child) => write!(f, "token({child})"),
            Parser::Action(action) => write!(f, "{}", action.child),
            Parser::Nonterminal(nonterminal) => {
                if *nonterminal.instance == nonterminal.rule.name {
                    write!(f, "{}", nonterminal.rule.name)
                } else {
                    write!(f, "{}:{}", nonterminal.rule.name, nonterminal.instance)
                }
            }
        }
    }
}

impl<V> fmt::Debug for Parser<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parser")
            .field(&format_args!("{self}"))
            .finish()
    }
}
