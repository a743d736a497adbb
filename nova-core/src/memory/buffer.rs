//! Bounded in-memory turn sequence for the active conversation

use std::collections::VecDeque;

use super::turn::Turn;

/// Holds the most recent turns of the active conversation.
///
/// Appending past capacity evicts the oldest turn; the buffer never fails
/// and has no persistence side effects.
#[derive(Debug, Clone)]
pub struct SessionBuffer {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl SessionBuffer {
    /// Create an empty buffer retaining at most `max_turns` turns.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_turns: usize) -> Self {
        let max_turns = max_turns.max(1);
        Self {
            turns: VecDeque::with_capacity(max_turns),
            max_turns,
        }
    }

    /// Append a turn, evicting the oldest ones if over capacity
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Replace the contents with the newest `max_turns` of `turns`, in order
    pub fn replace_with<'a, I>(&mut self, turns: I)
    where
        I: IntoIterator<Item = &'a Turn>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.turns.clear();
        for turn in turns.into_iter().rev().take(self.max_turns) {
            self.turns.push_front(turn.clone());
        }
    }

    /// Current turns, oldest first
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(buffer: &SessionBuffer) -> Vec<String> {
        buffer
            .snapshot()
            .iter()
            .map(|t| t.content().to_string())
            .collect()
    }

    #[test]
    fn test_append_within_capacity() {
        let mut buffer = SessionBuffer::new(4);
        buffer.append(Turn::user("a"));
        buffer.append(Turn::assistant("b"));

        assert_eq!(buffer.len(), 2);
        assert_eq!(contents(&buffer), vec!["a", "b"]);
    }

    #[test]
    fn test_eviction_keeps_newest_in_order() {
        let mut buffer = SessionBuffer::new(3);
        for i in 0..10 {
            buffer.append(Turn::user(format!("m{}", i)));
            assert!(buffer.len() <= 3);
        }
        assert_eq!(contents(&buffer), vec!["m7", "m8", "m9"]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = SessionBuffer::new(2);
        buffer.append(Turn::user("a"));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn test_replace_with_keeps_newest() {
        let turns: Vec<Turn> = (0..5).map(|i| Turn::user(format!("t{}", i))).collect();
        let mut buffer = SessionBuffer::new(2);
        buffer.append(Turn::user("stale"));

        buffer.replace_with(&turns);
        assert_eq!(contents(&buffer), vec!["t3", "t4"]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut buffer = SessionBuffer::new(0);
        buffer.append(Turn::user("a"));
        buffer.append(Turn::user("b"));
        assert_eq!(contents(&buffer), vec!["b"]);
    }
}
