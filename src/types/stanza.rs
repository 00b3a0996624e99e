use std::{
    collections::HashMap,
    fmt,
    io::{self, Write},
};

/// One RFC822-style control paragraph. Fields keep the order they were set in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stanza {
    fields: Vec<(String, String)>,
    // Field name -> position in `fields`
    index: HashMap<String, usize>,
}

impl Stanza {
    pub fn new() -> Self {
        Stanza::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&pos| self.fields[pos].1.as_str())
    }

    /// Set a field. An existing field keeps its position, a new one goes last.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.index.get(name) {
            Some(&pos) => self.fields[pos].1 = value,
            None => {
                self.index.insert(name.to_owned(), self.fields.len());
                self.fields.push((name.to_owned(), value));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Write all fields as `Field: value` lines.
    /// Continuation lines of a multi-line value are indented by one space,
    /// a value starting with a newline leaves the first line empty.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (name, value) in &self.fields {
            let mut lines = value.split('\n');
            match lines.next() {
                Some(first) if !first.is_empty() => write!(w, "{}: {}", name, first)?,
                _ => write!(w, "{}:", name)?,
            }
            for line in lines {
                write!(w, "\n {}", line)?;
            }
            w.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for Stanza {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Stanza {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut res = Stanza::new();
        for (k, v) in iter {
            let k: String = k.into();
            res.set(&k, v);
        }
        res
    }
}
