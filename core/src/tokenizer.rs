/// Split text into whitespace-delimited terms.
///
/// No normalization is applied: terms are case- and punctuation-sensitive, so
/// `Fox`, `fox` and `fox.` are three distinct terms. Documents and queries go
/// through this same function.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split_whitespace()
}
