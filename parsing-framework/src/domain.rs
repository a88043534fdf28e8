use crate::config::ParserConfig;
use crate::context::ParseContext;
use crate::error::{ExpectationFailure, GrammarError, ParsingError, ParsingException};
use crate::grammar::{Grammar, GrammarBuilder};
use crate::parser::ResolvedRule;
use crate::rule::Rule;
use indexmap::IndexMap;
use parsing_common::{GrammarId, Match, RuleId};
use scanner_framework::{ParseLog, Scanner};
use std::fmt;
use std::io::Write;
use std::ops::Deref;
use std::sync::Arc;

/// Adds grammars to a domain in dependency order.
///
/// Each grammar is linked as it is added, so every grammar it references
/// must already be part of the domain. A failed `grammar` call leaves the
/// builder unchanged.
pub struct DomainBuilder<V> {
    grammars: Vec<Grammar>,
    by_name: IndexMap<String, GrammarId>,
    rules: Vec<Rule<V>>,
    config: ParserConfig,
}

impl<V> DomainBuilder<V> {
    pub fn new() -> Self {
        Self {
            grammars: Vec::new(),
            by_name: IndexMap::new(),
            rules: Vec::new(),
            config: ParserConfig::default(),
        }
    }

    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds and links a grammar.
    pub fn grammar(mut self, builder: GrammarBuilder<V>) -> Result<Self, GrammarError> {
        self.add_grammar(builder)?;
        Ok(self)
    }

    /// Adds and links a grammar, returning its id.
    pub fn add_grammar(&mut self, builder: GrammarBuilder<V>) -> Result<GrammarId, GrammarError> {
        let qualified_name = builder.qualified_name();
        if self.by_name.contains_key(&qualified_name) {
            return Err(GrammarError::DuplicateGrammar {
                name: qualified_name,
            });
        }

        let mut references = Vec::with_capacity(builder.references.len());
        for reference in &builder.references {
            let id = self.by_name.get(reference).copied().ok_or_else(|| {
                GrammarError::UnknownGrammar {
                    grammar: qualified_name.clone(),
                    reference: reference.clone(),
                }
            })?;
            references.push(id);
        }

        let base = self.rules.len();
        let mut rule_ids = IndexMap::new();
        let mut inherited_counts = Vec::with_capacity(builder.rules.len());
        for (offset, rule) in builder.rules.iter().enumerate() {
            if rule_ids
                .insert(rule.name().to_string(), RuleId::new(base + offset))
                .is_some()
            {
                return Err(GrammarError::DuplicateRule {
                    grammar: qualified_name,
                    rule: rule.name().to_string(),
                });
            }
            inherited_counts.push(rule.inherited_count());
        }

        let mut linked_rules = IndexMap::new();
        for link in &builder.links {
            let id = self.resolve_link(&qualified_name, &references, &link.local_name, &link.target)?;
            linked_rules.insert(link.local_name.clone(), id);
        }

        let resolver = |name: &str| -> Option<ResolvedRule> {
            if let Some(&id) = rule_ids.get(name) {
                return Some(ResolvedRule {
                    id,
                    inherited: inherited_counts[id.index() - base],
                });
            }
            let id = linked_rules
                .get(name)
                .copied()
                .or_else(|| self.lookup_path(&references, name))?;
            Some(ResolvedRule {
                id,
                inherited: self.rules[id.index()].inherited_count(),
            })
        };

        let start_rule = match &builder.start {
            Some(name) => Some(resolver(name.as_str()).map(|rule| rule.id).ok_or_else(|| {
                GrammarError::MissingStartRule {
                    grammar: qualified_name.clone(),
                    rule: name.clone(),
                }
            })?),
            None => None,
        };
        let skip_rule = match &builder.skip {
            Some(name) => {
                let rule = resolver(name.as_str()).ok_or_else(|| GrammarError::MissingSkipRule {
                    grammar: qualified_name.clone(),
                    rule: name.clone(),
                })?;
                if rule.inherited > 0 {
                    return Err(GrammarError::SkipRuleWithAttributes {
                        grammar: qualified_name,
                        rule: name.clone(),
                        inherited: rule.inherited,
                    });
                }
                Some(rule.id)
            }
            None => None,
        };

        let mut rules = Vec::with_capacity(builder.rules.len());
        for (offset, rule) in builder.rules.into_iter().enumerate() {
            let mut rule = rule.build(RuleId::new(base + offset), &qualified_name);
            rule.link(&qualified_name, &resolver)?;
            rules.push(rule);
        }

        let id = GrammarId::new(self.grammars.len());
        log::debug!(
            "linked grammar {} ({} rules, {} links)",
            qualified_name,
            rules.len(),
            linked_rules.len()
        );
        self.rules.extend(rules);
        self.by_name.insert(qualified_name.clone(), id);
        self.grammars.push(Grammar {
            id,
            name: builder.name,
            namespace: builder.namespace,
            qualified_name,
            rules: rule_ids,
            links: builder.links,
            linked_rules,
            references,
            start_rule,
            skip_rule,
        });
        Ok(id)
    }

    pub fn build(self) -> ParsingDomain<V> {
        ParsingDomain {
            grammars: self.grammars,
            by_name: self.by_name,
            rules: self.rules,
            config: self.config,
        }
    }

    /// Resolves a `RuleLink` target, reporting why it cannot be resolved.
    fn resolve_link(
        &self,
        grammar: &str,
        references: &[GrammarId],
        local_name: &str,
        target: &str,
    ) -> Result<RuleId, GrammarError> {
        let Some((grammar_name, rule_name)) = target.rsplit_once('.') else {
            return Err(GrammarError::InvalidRulePath {
                grammar: grammar.to_string(),
                path: target.to_string(),
            });
        };
        let target_grammar = self.by_name.get(grammar_name).copied().ok_or_else(|| {
            GrammarError::UnknownGrammar {
                grammar: grammar.to_string(),
                reference: grammar_name.to_string(),
            }
        })?;
        if !references.contains(&target_grammar) {
            return Err(GrammarError::UnreferencedGrammar {
                grammar: grammar.to_string(),
                target: target.to_string(),
            });
        }
        self.grammars[target_grammar.index()]
            .rule(rule_name)
            .ok_or_else(|| GrammarError::RuleNotFound {
                grammar: grammar.to_string(),
                rule: local_name.to_string(),
                name: target.to_string(),
            })
    }

    /// Resolves a `Grammar.Rule` path against the referenced grammars.
    fn lookup_path(&self, references: &[GrammarId], path: &str) -> Option<RuleId> {
        let (grammar_name, rule_name) = path.rsplit_once('.')?;
        let id = *self.by_name.get(grammar_name)?;
        if !references.contains(&id) {
            return None;
        }
        self.grammars[id.index()].rule(rule_name)
    }
}

impl<V> Default for DomainBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable set of linked grammars sharing one rule table.
///
/// A domain holds no per-parse state; any number of parses, on any number
/// of threads, can run against it.
pub struct ParsingDomain<V> {
    grammars: Vec<Grammar>,
    by_name: IndexMap<String, GrammarId>,
    rules: Vec<Rule<V>>,
    config: ParserConfig,
}

impl<V> ParsingDomain<V> {
    pub fn builder() -> DomainBuilder<V> {
        DomainBuilder::new()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// A parse trace writing to `writer`, echoing as much input per line as
    /// the domain's configuration allows.
    pub fn parse_log(&self, writer: Box<dyn Write + Send>) -> ParseLog {
        ParseLog::new(writer).with_max_line_length(self.config.trace_line_length)
    }

    /// Looks up a grammar by qualified name.
    pub fn grammar(&self, name: &str) -> Option<GrammarRef<'_, V>> {
        let id = *self.by_name.get(name)?;
        self.grammar_by_id(id)
    }

    /// Like [`grammar`](Self::grammar), reporting a missing grammar as a
    /// `ParsingError`.
    pub fn require(&self, name: &str) -> Result<GrammarRef<'_, V>, ParsingError> {
        self.grammar(name).ok_or_else(|| ParsingError::UnknownGrammar {
            name: name.to_string(),
        })
    }

    pub fn grammar_by_id(&self, id: GrammarId) -> Option<GrammarRef<'_, V>> {
        let grammar = self.grammars.get(id.index())?;
        Some(GrammarRef {
            domain: self,
            grammar,
        })
    }

    pub fn grammars(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars.iter()
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule<V>> {
        self.rules.get(id.index())
    }

    pub fn rules(&self) -> &[Rule<V>] {
        &self.rules
    }
}

impl<V> fmt::Debug for ParsingDomain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsingDomain")
            .field("grammars", &self.by_name.keys().collect::<Vec<_>>())
            .field("rules", &self.rules.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Per-call inputs of a parse besides the text itself.
pub struct ParseOptions<V> {
    pub file_index: usize,
    pub file_name: Arc<str>,
    /// Inherited attributes of the start rule, in declaration order
    pub args: Vec<V>,
    pub log: Option<ParseLog>,
}

impl<V> ParseOptions<V> {
    pub fn new() -> Self {
        Self {
            file_index: 0,
            file_name: Arc::from(""),
            args: Vec::new(),
            log: None,
        }
    }

    pub fn file(mut self, file_index: usize, file_name: &str) -> Self {
        self.file_index = file_index;
        self.file_name = Arc::from(file_name);
        self
    }

    pub fn arg(mut self, value: V) -> Self {
        self.args.push(value);
        self
    }

    pub fn log(mut self, log: ParseLog) -> Self {
        self.log = Some(log);
        self
    }
}

impl<V> Default for ParseOptions<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A grammar of a domain, ready to parse.
pub struct GrammarRef<'d, V> {
    domain: &'d ParsingDomain<V>,
    grammar: &'d Grammar,
}

impl<'d, V> GrammarRef<'d, V> {
    pub fn grammar(&self) -> &'d Grammar {
        self.grammar
    }

    pub fn domain(&self) -> &'d ParsingDomain<V> {
        self.domain
    }

    /// Parses `input` completely with the start rule, returning its value.
    pub fn parse(&self, input: &str, file_index: usize, file_name: &str) -> Result<Option<V>, ParsingError> {
        self.parse_with(to_code_points(input), ParseOptions::new().file(file_index, file_name))
    }

    /// Like [`parse`](Self::parse), passing `args` as the start rule's
    /// inherited attributes.
    pub fn parse_with_args(
        &self,
        input: &str,
        file_index: usize,
        file_name: &str,
        args: Vec<V>,
    ) -> Result<Option<V>, ParsingError> {
        let mut options = ParseOptions::new().file(file_index, file_name);
        options.args = args;
        self.parse_with(to_code_points(input), options)
    }

    /// Parses a code-point buffer.
    ///
    /// The skip rule runs before and after the start rule, and the start
    /// rule must consume the whole input. Otherwise the parse fails with an
    /// `ExpectationFailure` naming the start rule at the farthest position
    /// the scanner reached.
    pub fn parse_with(&self, input: Arc<[char]>, options: ParseOptions<V>) -> Result<Option<V>, ParsingError> {
        let config = &self.domain.config;
        if config.max_input_len > 0 && input.len() > config.max_input_len {
            return Err(ParsingError::InputTooLarge {
                input_len: input.len(),
                max_len: config.max_input_len,
            });
        }

        let ParseOptions {
            file_index,
            file_name,
            args,
            log,
        } = options;
        let mut scanner = Scanner::new(Arc::clone(&input), file_index, Arc::clone(&file_name))
            .with_skip_rule(self.grammar.skip_rule);
        if let Some(log) = log {
            scanner = scanner.with_log(log);
        }
        let mut ctx = ParseContext::new(&self.domain.rules, scanner, config);

        let Some(start_rule) = self.grammar.start_rule.map(|id| ctx.rule(id)) else {
            let location = ctx.location(ctx.scanner.current_span());
            return Err(ParsingException::new(
                format!("grammar '{}' has no start rule", self.grammar.qualified_name),
                location,
            )
            .into());
        };
        if args.len() != start_rule.inherited_count() {
            return Err(ParsingError::ArgumentCount {
                rule: start_rule.full_name().to_string(),
                expected: start_rule.inherited_count(),
                found: args.len(),
            });
        }

        log::debug!(
            "parsing '{}' with {} ({} code points)",
            file_name,
            start_rule.full_name(),
            input.len()
        );
        for arg in args {
            ctx.stack.push(arg);
        }

        let outcome = run_start_rule(&mut ctx, start_rule);
        let flushed = ctx.finish();
        let matched = outcome?;
        flushed?;

        if !matched.is_hit() || !ctx.scanner.is_eof() {
            let span = ctx.scanner.farthest_span();
            log::debug!(
                "parse of '{}' stopped at {}",
                file_name,
                ctx.scanner.cursor().farthest()
            );
            return Err(ExpectationFailure::new(start_rule.info(), ctx.location(span)).into());
        }

        log::debug!("parsed '{}'", file_name);
        Ok(if start_rule.has_value() {
            ctx.stack.pop()
        } else {
            None
        })
    }
}

impl<V> Clone for GrammarRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for GrammarRef<'_, V> {}

impl<V> fmt::Debug for GrammarRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GrammarRef").field(self.grammar).finish()
    }
}

impl<V> Deref for GrammarRef<'_, V> {
    type Target = Grammar;

    fn deref(&self) -> &Grammar {
        self.grammar
    }
}

/// The grammar in source form, one rule per line.
impl<V> fmt::Display for GrammarRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grammar {}", self.grammar.qualified_name)?;
        writeln!(f, "{{")?;
        for reference in &self.grammar.references {
            if let Some(referenced) = self.domain.grammars.get(reference.index()) {
                writeln!(f, "    reference {};", referenced.qualified_name)?;
            }
        }
        for link in &self.grammar.links {
            writeln!(f, "    using {} = {};", link.local_name, link.target)?;
        }
        if let Some(rule) = self.grammar.skip_rule.and_then(|id| self.domain.rule(id)) {
            writeln!(f, "    skip {};", rule.name())?;
        }
        if let Some(rule) = self.grammar.start_rule.and_then(|id| self.domain.rule(id)) {
            writeln!(f, "    start {};", rule.name())?;
        }
        for (_, id) in self.grammar.rules() {
            if let Some(rule) = self.domain.rule(id) {
                writeln!(f, "    {rule}")?;
            }
        }
        write!(f, "}}")
    }
}

/// Skip, start rule, skip.
fn run_start_rule<V>(ctx: &mut ParseContext<'_, V>, rule: &Rule<V>) -> Result<Match, ParsingError> {
    ctx.skip()?;
    let matched = rule.parse(ctx)?;
    if matched.is_hit() {
        ctx.skip()?;
    }
    Ok(matched)
}

fn to_code_points(input: &str) -> Arc<[char]> {
    input.chars().collect::<Vec<_>>().into()
}
