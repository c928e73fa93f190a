/// What a code rule sees: one record's `output` and where it came from.
#[derive(Clone, Copy, Debug)]
pub struct CodeInput<'a> {
    pub line: usize,
    pub code: &'a str,
}

impl<'a> CodeInput<'a> {
    pub fn new(line: usize, code: &'a str) -> Self {
        Self { line, code }
    }
}
