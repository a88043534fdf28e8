use crate::context::ParseContext;
use crate::error::{GrammarError, ParsingError};
use crate::frame::AttributeFrame;
use crate::parser::{LinkScope, Parser, ResolvedRule};
use indexmap::IndexMap;
use parsing_common::{Checkpoint, Match, RuleId, Span, TextSlice};
use std::fmt;
use std::sync::Arc;

/// Remaining native stack below which a rule activation moves to a new
/// segment.
const STACK_RED_ZONE: usize = 256 * 1024;

/// Size of each stack segment allocated for deep rule nesting.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// A semantic action bound to a named point of a rule's parser tree.
pub type ActionFn<V> = Arc<dyn Fn(&mut ActionContext<'_, V>) + Send + Sync>;

/// Computes one inherited-attribute value for a nonterminal call from the
/// caller's frame.
pub type ArgumentFn<V> = Arc<dyn Fn(&AttributeFrame<V>) -> Option<V> + Send + Sync>;

/// Wraps a closure as a nonterminal argument.
pub fn argument<V, F>(f: F) -> ArgumentFn<V>
where
    F: Fn(&AttributeFrame<V>) -> Option<V> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An argument forwarding the caller's own inherited attribute `name`.
pub fn forward<V: Clone + 'static>(name: &str) -> ArgumentFn<V> {
    let name: Arc<str> = Arc::from(name);
    Arc::new(move |frame: &AttributeFrame<V>| frame.inherited(&name).cloned())
}

/// What a semantic action sees when it runs.
pub struct ActionContext<'a, V> {
    frame: &'a mut AttributeFrame<V>,
    text: TextSlice,
    span: Span,
    file_name: Arc<str>,
    /// Clearing this turns the successful match into a soft failure.
    pub pass: bool,
    error: Option<String>,
}

impl<'a, V> ActionContext<'a, V> {
    pub(crate) fn new(
        frame: &'a mut AttributeFrame<V>,
        text: TextSlice,
        span: Span,
        file_name: Arc<str>,
    ) -> Self {
        Self {
            frame,
            text,
            span,
            file_name,
            pass: true,
            error: None,
        }
    }

    /// The code points matched by the action's parser.
    pub fn text(&self) -> &TextSlice {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn frame(&self) -> &AttributeFrame<V> {
        &*self.frame
    }

    pub fn frame_mut(&mut self) -> &mut AttributeFrame<V> {
        &mut *self.frame
    }

    pub fn set_value(&mut self, value: V) {
        self.frame.set_value(value);
    }

    pub fn take_instance(&mut self, name: &str) -> Option<V> {
        self.frame.take_instance(name)
    }

    /// Rejects the match as if the action's parser had failed.
    pub fn reject(&mut self) {
        self.pass = false;
    }

    /// Aborts the whole parse with a `ParsingException` at the action's span.
    pub fn raise(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn finish(self) -> (bool, Option<String>) {
        (self.pass, self.error)
    }
}

/// Declares a rule of a grammar before it is linked.
pub struct RuleBuilder<V> {
    name: String,
    definition: Parser<V>,
    info: Option<String>,
    value_type: Option<String>,
    inherited: Vec<Arc<str>>,
    locals: Vec<Arc<str>>,
    actions: IndexMap<String, ActionFn<V>>,
}

impl<V> RuleBuilder<V> {
    pub fn new(name: impl Into<String>, definition: Parser<V>) -> Self {
        Self {
            name: name.into(),
            definition,
            info: None,
            value_type: None,
            inherited: Vec::new(),
            locals: Vec::new(),
            actions: IndexMap::new(),
        }
    }

    /// Human-readable description used in diagnostics.
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Declares that the rule synthesizes a value of the named kind.
    pub fn value(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    /// Declares the next inherited attribute. Callers pass arguments in
    /// declaration order.
    pub fn inherited(mut self, name: &str) -> Self {
        self.inherited.push(Arc::from(name));
        self
    }

    pub fn local(mut self, name: &str) -> Self {
        self.locals.push(Arc::from(name));
        self
    }

    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, V>) + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn inherited_count(&self) -> usize {
        self.inherited.len()
    }

    pub(crate) fn build(self, id: RuleId, grammar: &str) -> Rule<V> {
        let full_name = format!("{grammar}.{}", self.name);
        Rule {
            id,
            info: self.info.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            full_name,
            definition: self.definition,
            value_type: self.value_type,
            inherited: self.inherited,
            locals: self.locals,
            actions: self.actions,
        }
    }
}

/// A linked rule in a parsing domain's rule table.
pub struct Rule<V> {
    id: RuleId,
    name: String,
    full_name: String,
    info: String,
    definition: Parser<V>,
    value_type: Option<String>,
    inherited: Vec<Arc<str>>,
    locals: Vec<Arc<str>>,
    actions: IndexMap<String, ActionFn<V>>,
}

impl<V> Rule<V> {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace.Grammar.Rule`
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn definition(&self) -> &Parser<V> {
        &self.definition
    }

    pub fn value_type(&self) -> Option<&str> {
        self.value_type.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value_type.is_some()
    }

    pub fn inherited(&self) -> impl Iterator<Item = &str> {
        self.inherited.iter().map(|name| &**name)
    }

    pub fn inherited_count(&self) -> usize {
        self.inherited.len()
    }

    pub fn locals(&self) -> impl Iterator<Item = &str> {
        self.locals.iter().map(|name| &**name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Resolves the nonterminals and actions of the rule's tree.
    pub(crate) fn link(
        &mut self,
        grammar: &str,
        resolver: &dyn Fn(&str) -> Option<ResolvedRule>,
    ) -> Result<(), GrammarError> {
        let scope = LinkScope {
            grammar,
            rule: &self.name,
            actions: &self.actions,
            resolver,
        };
        self.definition.link(&scope)
    }

    /// Runs one activation of the rule at the scanner's position.
    ///
    /// The activation owns a fresh frame. On entry the inherited values are
    /// popped from the value stack; on success a valued rule pushes its
    /// result. On failure the scanner is restored and nothing is pushed.
    ///
    /// Activations nest as deeply as the grammar recurses, so the native
    /// stack is extended on the heap whenever less than a red zone remains.
    pub(crate) fn parse(&self, ctx: &mut ParseContext<'_, V>) -> Result<Match, ParsingError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.activate(ctx))
    }

    fn activate(&self, ctx: &mut ParseContext<'_, V>) -> Result<Match, ParsingError> {
        ctx.enter_rule(self)?;
        let start = ctx.scanner.checkpoint();
        match self.evaluate(ctx, start) {
            Ok(matched) => {
                ctx.leave_rule(self, start, matched)?;
                Ok(matched)
            }
            Err(error) => {
                ctx.abandon_rule(self, start);
                Err(error)
            }
        }
    }

    fn evaluate(&self, ctx: &mut ParseContext<'_, V>, start: Checkpoint) -> Result<Match, ParsingError> {
        let mut frame = AttributeFrame::new(&self.locals);
        let mut values = Vec::with_capacity(self.inherited.len());
        for _ in &self.inherited {
            let value = ctx
                .stack
                .pop()
                .ok_or_else(|| ParsingError::ValueStackUnderflow {
                    rule: self.full_name.clone(),
                })?;
            values.push(value);
        }
        // The last declared attribute was pushed last.
        for (name, value) in self.inherited.iter().zip(values.into_iter().rev()) {
            frame.bind_inherited(Arc::clone(name), value);
        }

        if !self.definition.parse(ctx, &mut frame)?.is_hit() {
            ctx.scanner.restore(start);
            return Ok(Match::nothing());
        }
        if self.has_value() {
            let value = frame
                .take_value()
                .ok_or_else(|| ParsingError::MissingRuleValue {
                    rule: self.full_name.clone(),
                })?;
            ctx.stack.push(value);
        }
        Ok(ctx.matched_since(start))
    }
}

impl<V> fmt::Display for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.inherited.is_empty() {
            let names: Vec<&str> = self.inherited().collect();
            write!(f, "({})", names.join(", "))?;
        }
        if let Some(value_type) = &self.value_type {
            write!(f, " : {value_type}")?;
        }
        write!(f, " ::= {};", self.definition)
    }
}

impl<V> fmt::Debug for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("value_type", &self.value_type)
            .field("inherited", &self.inherited)
            .field("locals", &self.locals)
            .finish()
    }
}
