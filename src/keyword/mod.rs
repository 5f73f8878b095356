mod normalize;
mod parse;
#[cfg(test)]
mod tests;

pub use normalize::{NormalizedKey, normalize};
pub use parse::{EntryParser, GRAMMAR_VERSION, parse_number, split_entries};
