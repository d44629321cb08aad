/// Line terminator used when the tree has to write one of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EndOfLine {
    #[default]
    Lf,
    CrLf,
}

impl EndOfLine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Tally of the line terminators found in some text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EolCounts {
    pub cr: usize,
    pub lf: usize,
    pub crlf: usize,
}

impl EolCounts {
    pub fn scan(text: &str) -> Self {
        let mut counts = Self::default();
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    counts.crlf += 1;
                    i += 1;
                }
                b'\r' => counts.cr += 1,
                b'\n' => counts.lf += 1,
                _ => {}
            }
            i += 1;
        }
        counts
    }

    pub fn merge(&mut self, other: EolCounts) {
        self.cr += other.cr;
        self.lf += other.lf;
        self.crlf += other.crlf;
    }

    /// Recounts a lone `\r` ending one text and a lone `\n` starting the
    /// next as a single `\r\n`.
    pub fn join_split_pair(&mut self) {
        if self.cr > 0 && self.lf > 0 {
            self.cr -= 1;
            self.lf -= 1;
            self.crlf += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.cr + self.lf + self.crlf
    }

    /// The terminator the text mostly uses, `fallback` when it has none.
    pub fn dominant(&self, fallback: EndOfLine) -> EndOfLine {
        if self.total() == 0 {
            fallback
        } else if self.crlf > self.total() / 2 {
            EndOfLine::CrLf
        } else {
            EndOfLine::Lf
        }
    }
}

/// Rewrites every `\r\n`, `\r` and `\n` in `text` as `eol`.
pub fn normalize_eol(text: &str, eol: EndOfLine) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(['\r', '\n']) {
        out.push_str(&rest[..pos]);
        out.push_str(eol.as_str());
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pair_is_counted_once() {
        let mut counts = EolCounts::scan("a\r");
        counts.merge(EolCounts::scan("\nb\n"));
        counts.join_split_pair();
        assert_eq!(counts, EolCounts { cr: 0, lf: 1, crlf: 1 });

        let mut none = EolCounts::scan("\n");
        none.join_split_pair();
        assert_eq!(none, EolCounts { cr: 0, lf: 1, crlf: 0 });
    }

    #[test]
    fn counts_each_terminator_kind() {
        let counts = EolCounts::scan("a\r\nb\nc\rd\r\n");
        assert_eq!(counts, EolCounts { cr: 1, lf: 1, crlf: 2 });
        assert_eq!(counts.dominant(EndOfLine::Lf), EndOfLine::Lf);
        assert_eq!(EolCounts::scan("a\r\nb\r\n").dominant(EndOfLine::Lf), EndOfLine::CrLf);
        assert_eq!(EolCounts::scan("abc").dominant(EndOfLine::CrLf), EndOfLine::CrLf);
    }

    #[test]
    fn normalize_rewrites_all_breaks() {
        assert_eq!(normalize_eol("a\r\nb\rc\nd", EndOfLine::Lf), "a\nb\nc\nd");
        assert_eq!(normalize_eol("a\nb\r\n", EndOfLine::CrLf), "a\r\nb\r\n");
        assert_eq!(normalize_eol("", EndOfLine::CrLf), "");
    }
}
