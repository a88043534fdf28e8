/// Stack of semantic values exchanged between rule activations.
///
/// Callers push argument values before a nonterminal call and the callee
/// pops them into its inherited attributes on entry. A valued rule pushes
/// its result on success, and the caller pops it into the matching
/// nonterminal instance.
#[derive(Debug, Clone)]
pub struct ValueStack<V> {
    values: Vec<V>,
}

impl<V> ValueStack<V> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn push(&mut self, value: V) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<V> {
        self.values.pop()
    }

    pub fn peek(&self) -> Option<&V> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drops every value above `len`.
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

impl<V> Default for ValueStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_is_lifo() {
        let mut stack = ValueStack::new();
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.peek(), Some(&2));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_truncate_discards_values_above_mark() {
        let mut stack = ValueStack::new();
        stack.push("a");
        let mark = stack.len();
        stack.push("b");
        stack.push("c");
        stack.truncate(mark);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.peek(), Some(&"a"));
    }
}
