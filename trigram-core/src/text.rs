use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Lazy whitespace tokenizer over a buffered byte stream.
///
/// Scans the reader's buffer directly and yields each word as soon as its
/// delimiter is seen, so only the unfinished word is carried between reads.
/// Invalid UTF-8 sequences are replaced with `U+FFFD` rather than rejected.
///
/// On a read failure, the words already read (including a trailing partial
/// one) are yielded first, then the error.
pub(crate) struct Words<R> {
	reader: R,
	token: Vec<u8>,
	pending: VecDeque<String>,
	error: Option<io::Error>,
	done: bool,
}

impl<R: BufRead> Words<R> {
	pub(crate) fn new(reader: R) -> Self {
		Self {
			reader,
			token: Vec::new(),
			pending: VecDeque::new(),
			error: None,
			done: false,
		}
	}
}

/// ASCII whitespace as delimited by the byte scan. `U+0085`, `U+00A0` and
/// other multi-byte spaces are split after decoding.
fn is_space(byte: u8) -> bool {
	matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0B' | b'\x0C')
}

/// Decodes the carried bytes into words and clears them.
fn flush(token: &mut Vec<u8>, pending: &mut VecDeque<String>) {
	if token.is_empty() {
		return;
	}
	let word = String::from_utf8_lossy(token);
	pending.extend(word.split_whitespace().map(str::to_owned));
	token.clear();
}

impl<R: BufRead> Iterator for Words<R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(word) = self.pending.pop_front() {
				return Some(Ok(word));
			}
			if let Some(e) = self.error.take() {
				return Some(Err(e));
			}
			if self.done {
				return None;
			}

			match self.reader.fill_buf() {
				Ok([]) => {
					self.done = true;
					flush(&mut self.token, &mut self.pending);
				}
				Ok(buf) => {
					let read = buf.len();
					for &byte in buf {
						if is_space(byte) {
							flush(&mut self.token, &mut self.pending);
						} else {
							self.token.push(byte);
						}
					}
					self.reader.consume(read);
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
				Err(e) => {
					self.done = true;
					flush(&mut self.token, &mut self.pending);
					self.error = Some(e);
				}
			}
		}
	}
}

/// Turns an assembled word sequence into a sentence.
///
/// - Uppercases the first character if it is not uppercase already
/// - Appends a period after a trailing letter or digit
/// - Replaces a trailing comma with a period
///
/// Any other trailing character (`.`, `!`, `?`, quotes...) is left as is.
///
/// # Panics
/// Panics on empty input: callers must always pass at least one character.
pub fn normalize(text: &str) -> String {
	assert!(!text.is_empty(), "cannot normalize empty text");

	let mut normalized = String::with_capacity(text.len() + 1);
	let mut chars = text.chars();
	if let Some(first) = chars.next() {
		if first.is_uppercase() {
			normalized.push(first);
		} else {
			normalized.extend(first.to_uppercase());
		}
	}
	normalized.push_str(chars.as_str());

	match normalized.chars().last() {
		Some(last) if last.is_alphanumeric() => normalized.push('.'),
		Some(',') => {
			normalized.pop();
			normalized.push('.');
		}
		_ => (),
	}

	normalized
}
