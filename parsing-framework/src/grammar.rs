use crate::rule::RuleBuilder;
use indexmap::IndexMap;
use parsing_common::{GrammarId, RuleId};

/// Makes a rule of a referenced grammar callable under a local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLink {
    /// Name used by nonterminals of the linking grammar
    pub local_name: String,
    /// `namespace.Grammar.Rule` path of the target rule
    pub target: String,
}

/// Collects the rules and declarations of one grammar before it is added to
/// a [`ParsingDomain`](crate::ParsingDomain).
pub struct GrammarBuilder<V> {
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) references: Vec<String>,
    pub(crate) links: Vec<RuleLink>,
    pub(crate) rules: Vec<RuleBuilder<V>>,
    pub(crate) start: Option<String>,
    pub(crate) skip: Option<String>,
}

impl<V> GrammarBuilder<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            references: Vec::new(),
            links: Vec::new(),
            rules: Vec::new(),
            start: None,
            skip: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Declares a dependency on another grammar by qualified name.
    pub fn reference(mut self, grammar: impl Into<String>) -> Self {
        self.references.push(grammar.into());
        self
    }

    /// Makes the rule at `target` callable as `local_name`.
    pub fn link(mut self, local_name: impl Into<String>, target: impl Into<String>) -> Self {
        self.links.push(RuleLink {
            local_name: local_name.into(),
            target: target.into(),
        });
        self
    }

    pub fn rule(mut self, rule: RuleBuilder<V>) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rule a parse of this grammar starts with.
    pub fn start(mut self, rule: impl Into<String>) -> Self {
        self.start = Some(rule.into());
        self
    }

    /// The rule applied between sub-parsers to skip insignificant input.
    pub fn skip(mut self, rule: impl Into<String>) -> Self {
        self.skip = Some(rule.into());
        self
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }
}

pub(crate) fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(namespace) if !namespace.is_empty() => format!("{namespace}.{name}"),
        _ => name.to_string(),
    }
}

/// A linked grammar: a named set of rules in a domain's rule table.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) id: GrammarId,
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) qualified_name: String,
    pub(crate) rules: IndexMap<String, RuleId>,
    pub(crate) links: Vec<RuleLink>,
    pub(crate) linked_rules: IndexMap<String, RuleId>,
    pub(crate) references: Vec<GrammarId>,
    pub(crate) start_rule: Option<RuleId>,
    pub(crate) skip_rule: Option<RuleId>,
}

impl Grammar {
    pub fn id(&self) -> GrammarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Rules defined by this grammar, in definition order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, RuleId)> {
        self.rules.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Looks up a rule defined by this grammar or linked into it.
    pub fn rule(&self, name: &str) -> Option<RuleId> {
        self.rules
            .get(name)
            .or_else(|| self.linked_rules.get(name))
            .copied()
    }

    pub fn links(&self) -> &[RuleLink] {
        &self.links
    }

    pub fn references(&self) -> &[GrammarId] {
        &self.references
    }

    pub fn start_rule(&self) -> Option<RuleId> {
        self.start_rule
    }

    pub fn skip_rule(&self) -> Option<RuleId> {
        self.skip_rule
    }
}
