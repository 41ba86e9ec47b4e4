/// Fixed-universe set of node indices backed by a bit vector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeSet {
    words: Vec<u64>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve_words(&mut self, words: usize) {
        if self.words.len() < words {
            self.words.resize(words, 0);
        }
    }

    pub fn insert(&mut self, idx: usize) -> bool {
        let w = idx / 64;
        let b = 1u64 << (idx % 64);
        self.reserve_words(w + 1);
        let exists = self.words[w] & b != 0;
        self.words[w] |= b;
        !exists
    }

    pub fn union_with(&mut self, other: &NodeSet) {
        self.reserve_words(other.words.len());
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w |= *o;
        }
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }
}
