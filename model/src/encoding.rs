use std::collections::HashMap;

/// Per-run table handing out compact tokens for component encoding keys.
///
/// Tokens are allocated in insertion order and rendered in base 36. They are only
/// meaningful within one run: [`EncodingTable::reset`] starts over from `0`.
#[derive(Debug, Default)]
pub struct EncodingTable {
    tokens: Vec<String>,
    key_to_index: HashMap<String, usize>,
}

impl EncodingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `key`, allocating the next one on first use.
    pub fn token(&mut self, key: &str) -> &str {
        let i = match self.lookup(key) {
            Some(i) => i,
            None => self.insert(key),
        };
        &self.tokens[i]
    }

    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.key_to_index.get(key).copied()
    }

    fn insert(&mut self, key: &str) -> usize {
        let i = self.tokens.len();
        self.key_to_index.insert(key.to_string(), i);
        self.tokens.push(to_base36(i));
        i
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn reset(&mut self) {
        self.tokens.clear();
        self.key_to_index.clear();
    }
}

fn to_base36(mut n: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[n % 36]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Output buffer for canonical encodings.
pub struct Encoder<'a> {
    table: &'a mut EncodingTable,
    output: String,
}

impl<'a> Encoder<'a> {
    pub fn new(table: &'a mut EncodingTable) -> Self {
        Self {
            table,
            output: String::new(),
        }
    }

    pub fn tag(&mut self, c: char) {
        self.output.push(c);
    }

    pub fn text(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn token(&mut self, key: &str) {
        let token = self.table.token(key);
        self.output.push_str(token);
    }

    pub fn finish(self) -> String {
        self.output
    }
}

/// Anything with a canonical, per-run token encoding.
pub trait Encode {
    fn encode(&self, e: &mut Encoder);

    fn encoded(&self, table: &mut EncodingTable) -> String {
        let mut e = Encoder::new(table);
        self.encode(&mut e);
        e.finish()
    }
}
