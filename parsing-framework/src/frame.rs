use std::fmt;
use std::sync::Arc;

/// Per-activation attribute storage of a rule.
///
/// A fresh frame is created every time a rule is entered and dropped when
/// it returns, so recursive activations of the same rule never observe each
/// other's values. The frame holds:
///
/// - the synthesized value the rule returns, if any,
/// - the inherited attributes popped from the value stack on entry,
/// - the rule's declared local variables,
/// - the values returned by nonterminal instances called from the body.
pub struct AttributeFrame<V> {
    value: Option<V>,
    inherited: Vec<(Arc<str>, V)>,
    locals: Vec<(Arc<str>, Option<V>)>,
    instances: Vec<(Arc<str>, V)>,
}

impl<V> AttributeFrame<V> {
    /// Creates an empty frame with the given local variable slots.
    pub fn new(locals: &[Arc<str>]) -> Self {
        Self {
            value: None,
            inherited: Vec::new(),
            locals: locals.iter().map(|name| (Arc::clone(name), None)).collect(),
            instances: Vec::new(),
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    pub fn set_value(&mut self, value: V) {
        self.value = Some(value);
    }

    pub fn take_value(&mut self) -> Option<V> {
        self.value.take()
    }

    pub fn inherited(&self, name: &str) -> Option<&V> {
        self.inherited
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    pub fn inherited_mut(&mut self, name: &str) -> Option<&mut V> {
        self.inherited
            .iter_mut()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn bind_inherited(&mut self, name: Arc<str>, value: V) {
        self.inherited.push((name, value));
    }

    pub fn local(&self, name: &str) -> Option<&V> {
        self.locals
            .iter()
            .find(|(key, _)| &**key == name)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn local_mut(&mut self, name: &str) -> Option<&mut V> {
        self.locals
            .iter_mut()
            .find(|(key, _)| &**key == name)
            .and_then(|(_, value)| value.as_mut())
    }

    /// Stores a local variable. Returns `false` if the rule declares no
    /// local of that name.
    pub fn set_local(&mut self, name: &str, value: V) -> bool {
        match self.locals.iter_mut().find(|(key, _)| &**key == name) {
            Some((_, slot)) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn take_local(&mut self, name: &str) -> Option<V> {
        self.locals
            .iter_mut()
            .find(|(key, _)| &**key == name)
            .and_then(|(_, value)| value.take())
    }

    /// The value most recently returned by the nonterminal instance `name`.
    pub fn instance(&self, name: &str) -> Option<&V> {
        self.instances
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    pub fn take_instance(&mut self, name: &str) -> Option<V> {
        let index = self.instances.iter().position(|(key, _)| &**key == name)?;
        Some(self.instances.swap_remove(index).1)
    }

    pub(crate) fn set_instance(&mut self, name: &Arc<str>, value: V) {
        match self.instances.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.instances.push((Arc::clone(name), value)),
        }
    }
}

impl<V> Default for AttributeFrame<V> {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl<V: fmt::Debug> fmt::Debug for AttributeFrame<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeFrame")
            .field("value", &self.value)
            .field("inherited", &self.inherited)
            .field("locals", &self.locals)
            .field("instances", &self.instances)
            .finish()
    }
}
