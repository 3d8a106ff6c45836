//! A word level Markov chain text generator.
//!
//! Every pair of consecutive words in the input is a transition. Words live
//! in a [`Tree`] ordered by their text, and each word keeps a tree of the
//! words that followed it. Follower trees count duplicates, so the number of
//! times a transition was seen is simply the count of the follower.
//!
//! # Examples
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! use bstree::markov::TransitionTable;
//!
//! let table = TransitionTable::from_reader("the cat saw the dog".as_bytes(), " ").unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let chain = table.generate(Some("cat"), 3, &mut rng).unwrap();
//! assert_eq!(chain, ["cat", "saw", "the"]);
//! ```

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;

use rand::Rng;

use crate::{Ops, Tree};

/// Once a line of output reaches this many characters, wrapping starts a new
/// one.
pub const WRAP_WIDTH: usize = 80;

/// Errors building or walking a [`TransitionTable`].
#[derive(Debug, thiserror::Error)]
pub enum MarkovError {
    /// Reading the input failed.
    #[error("failed to read input")]
    Io(#[from] io::Error),
    /// The requested first word never occurs in the input.
    #[error("initial word {0:?} not found in the input, make sure it really occurs in the text")]
    UnknownWord(String),
}

struct Word {
    text: String,
    /// Number of transitions out of this word.
    seen: usize,
    followers: Tree<String>,
}

impl Word {
    fn new(text: &str, follower_ops: &Ops<String>) -> Self {
        Self {
            text: text.to_owned(),
            seen: 0,
            followers: Tree::new(follower_ops.clone()),
        }
    }

    fn record(&mut self, next: &str) {
        self.seen += 1;
        self.followers.insert(next.to_owned());
    }
}

fn word_ops() -> Ops<Word> {
    Ops::owning(
        |a: &Word, b: &Word| a.text.cmp(&b.text),
        |word: Word| log::trace!("releasing word {:?} seen {} times", word.text, word.seen),
    )
}

/// All transitions seen in some text.
pub struct TransitionTable {
    words: Tree<Word>,
    /// Shared by every follower tree and by lookup keys.
    follower_ops: Ops<String>,
    transitions: usize,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            words: Tree::new(word_ops()),
            follower_ops: Ops::ordered(),
            transitions: 0,
        }
    }

    /// Builds a table from every line of `reader`. Words are separated by
    /// any of the characters in `delimiter` and transitions carry over line
    /// breaks. The last word transitions to itself so the chain can always
    /// continue.
    ///
    /// Input need not be UTF-8: invalid sequences become
    /// [`char::REPLACEMENT_CHARACTER`].
    pub fn from_reader<R: BufRead>(mut reader: R, delimiter: &str) -> Result<Self, MarkovError> {
        let mut table = Self::new();
        let mut previous: Option<String> = None;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(&['\n', '\r'][..]);
            for token in tokens(line, delimiter) {
                if let Some(previous) = &previous {
                    table.add_transition(previous, token);
                }
                previous = Some(token.to_owned());
            }
        }
        if let Some(last) = previous {
            table.add_transition(&last, &last);
        }

        log::debug!(
            "read {} transitions between {} distinct words",
            table.transitions,
            table.words.size()
        );
        Ok(table)
    }

    /// Records that `next` followed `current`.
    pub fn add_transition(&mut self, current: &str, next: &str) {
        let mut key = self.key(current);
        match self.words.search_mut(&key) {
            Some(word) => word.record(next),
            None => {
                key.record(next);
                self.words.insert(key);
            }
        }
        self.transitions += 1;
    }

    /// A word with nothing recorded, for looking up `text`.
    fn key(&self, text: &str) -> Word {
        Word::new(text, &self.follower_ops)
    }

    /// Whether no transition has been recorded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of distinct words that are followed by something.
    pub fn words(&self) -> usize {
        self.words.size()
    }

    /// Number of transitions recorded.
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// How likely `next` is to follow `current`, between 0 and 1.
    pub fn probability(&self, current: &str, next: &str) -> f64 {
        let Some(word) = self.words.search(&self.key(current)) else {
            return 0.0;
        };
        word.followers.count(&next.to_owned()) as f64 / word.seen as f64
    }

    /// Picks a word following `current`, weighted by how often it did.
    pub fn choose_next<R>(&self, current: &str, rng: &mut R) -> Option<&str>
    where
        R: Rng + ?Sized,
    {
        let word = self.words.search(&self.key(current))?;
        if word.seen == 0 {
            return None;
        }

        // Each follower is visited once per time it was seen, so a uniform
        // pick among the visits is weighted by frequency.
        let mut skip = rng.gen_range(0..word.seen);
        let mut chosen = None;
        word.followers.traverse_counted(|next| {
            if skip == 0 {
                chosen = Some(next.as_str());
                return ControlFlow::Break(());
            }
            skip -= 1;
            ControlFlow::Continue(())
        });
        chosen
    }

    /// Walks the chain for `length` words, starting at `initial` or, without
    /// one, at an arbitrary known word. An empty table yields an empty chain.
    pub fn generate<R>(
        &self,
        initial: Option<&str>,
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<&str>, MarkovError>
    where
        R: Rng + ?Sized,
    {
        let first = match (initial, self.words.root()) {
            (_, None) => return Ok(Vec::new()),
            (Some(initial), Some(_)) => self
                .words
                .search(&self.key(initial))
                .map(|word| word.text.as_str())
                .ok_or_else(|| MarkovError::UnknownWord(initial.to_owned()))?,
            (None, Some(root)) => root.text.as_str(),
        };

        let mut chain = Vec::with_capacity(length);
        let mut current = first;
        while chain.len() < length {
            chain.push(current);
            if chain.len() == length {
                break;
            }
            match self.choose_next(current, rng) {
                Some(next) => current = next,
                None => {
                    log::warn!(
                        "{current:?} has no followers, stopping after {} words",
                        chain.len()
                    );
                    break;
                }
            }
        }
        Ok(chain)
    }

    /// Writes every word followed by the probability of each of its
    /// followers, all in sorted order.
    pub fn write_stats<W: Write>(&self, mut out: W) -> io::Result<()> {
        let mut result = Ok(());
        self.words.traverse(|word| {
            result = self.write_word(&mut out, word);
            keep_going(&result)
        });
        result
    }

    fn write_word<W: Write>(&self, out: &mut W, word: &Word) -> io::Result<()> {
        writeln!(out, "{}", word.text)?;
        let seen = word.seen as f64;
        let mut result = Ok(());
        word.followers.traverse(|next| {
            let probability = word.followers.count(next) as f64 / seen;
            result = writeln!(out, "    {next} : {probability:.2}");
            keep_going(&result)
        });
        result
    }
}

fn keep_going(result: &io::Result<()>) -> ControlFlow<()> {
    match result {
        Ok(()) => ControlFlow::Continue(()),
        Err(_) => ControlFlow::Break(()),
    }
}

/// Splits `line` on any character of `delimiter`, skipping empty words.
pub fn tokens<'a>(line: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    line.split(move |c: char| delimiter.contains(c))
        .filter(|token| !token.is_empty())
}

/// Formats a chain for printing: every word followed by `delimiter`, with a
/// line break before a word once a line reached [`WRAP_WIDTH`] characters if
/// `wrap` is set, and a final line break.
pub fn render(chain: &[&str], delimiter: &str, wrap: bool) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for word in chain {
        if wrap && line_len >= WRAP_WIDTH {
            out.push('\n');
            line_len = 0;
        }
        out.push_str(word);
        out.push_str(delimiter);
        line_len += word.chars().count() + delimiter.chars().count();
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn table(text: &str) -> TransitionTable {
        TransitionTable::from_reader(text.as_bytes(), " ").unwrap()
    }

    #[test]
    fn counts_transitions() {
        let table = table("a b a c");

        // a -> b, b -> a, a -> c and c -> c.
        assert_eq!(table.transitions(), 4);
        assert_eq!(table.words(), 3);
        assert_eq!(table.probability("a", "b"), 0.5);
        assert_eq!(table.probability("a", "c"), 0.5);
        assert_eq!(table.probability("b", "a"), 1.0);
        assert_eq!(table.probability("c", "c"), 1.0);
        assert_eq!(table.probability("c", "a"), 0.0);
        assert_eq!(table.probability("z", "a"), 0.0);
    }

    #[test]
    fn transitions_span_lines() {
        let table = table("a\n\nb\n");

        assert_eq!(table.probability("a", "b"), 1.0);
        assert_eq!(table.probability("b", "b"), 1.0);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let table = TransitionTable::from_reader(&b"caf\xe9 au lait\r\nthe end"[..], " ").unwrap();

        assert_eq!(table.words(), 5);
        assert_eq!(table.probability("caf\u{fffd}", "au"), 1.0);
        assert_eq!(table.probability("lait", "the"), 1.0);
        assert_eq!(table.probability("end", "end"), 1.0);
    }

    #[test]
    fn repeated_words_are_stored_once() {
        let table = table("a a a b a");

        // a -> a three times (the last one is the final self transition).
        assert_eq!(table.transitions(), 5);
        assert_eq!(table.words(), 2);
        assert_eq!(table.words.count(&table.key("a")), 1);
        assert_eq!(table.probability("a", "a"), 0.75);
        assert_eq!(table.probability("a", "b"), 0.25);
        assert_eq!(table.probability("b", "a"), 1.0);
    }

    #[test]
    fn tokens_split_on_any_delimiter_char() {
        let words: Vec<_> = tokens(",a;;b, c,", ",;").collect();

        assert_eq!(words, ["a", "b", " c"]);
    }

    #[test]
    fn empty_input() {
        let table = table("");
        let mut rng = StdRng::seed_from_u64(0);

        assert!(table.is_empty());
        assert!(table.generate(None, 10, &mut rng).unwrap().is_empty());
        assert!(table.generate(Some("a"), 10, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn unknown_initial_word() {
        let table = table("a b");
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            table.generate(Some("c"), 10, &mut rng),
            Err(MarkovError::UnknownWord(word)) if word == "c"
        ));
    }

    #[test]
    fn single_path_chain() {
        let table = table("a b");
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(table.generate(Some("a"), 4, &mut rng).unwrap(), ["a", "b", "b", "b"]);
        assert_eq!(table.generate(Some("a"), 0, &mut rng).unwrap(), Vec::<&str>::new());
    }

    #[test]
    fn default_start_is_a_known_word() {
        let table = table("x y z");
        let mut rng = StdRng::seed_from_u64(0);

        let chain = table.generate(None, 1, &mut rng).unwrap();
        assert_eq!(chain, ["y"]);
    }

    #[test]
    fn chosen_words_are_followers() {
        let table = table("a b a c a b a a");
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let next = table.choose_next("a", &mut rng).unwrap();
            assert!(["a", "b", "c"].contains(&next));
        }
        assert_eq!(table.choose_next("z", &mut rng), None);
    }

    #[test]
    fn stats() {
        let table = table("a b a c");
        let mut out = Vec::new();
        table.write_stats(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a\n    b : 0.50\n    c : 0.50\nb\n    a : 1.00\nc\n    c : 1.00\n"
        );
    }

    #[test]
    fn render_wraps_long_lines() {
        let chain = ["abcdefghi"; 9];

        assert_eq!(render(&chain[..2], " ", true), "abcdefghi abcdefghi \n");
        let wrapped = render(&chain, " ", true);
        assert_eq!(wrapped.lines().count(), 2);
        assert_eq!(wrapped.lines().next().unwrap().len(), 80);
        assert_eq!(render(&chain, " ", false).lines().count(), 1);
    }

    #[test]
    fn empty_chain_renders_a_line_break() {
        assert_eq!(render(&[], " ", true), "\n");
    }
}
