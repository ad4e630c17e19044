//! Find-and-replace over whole files.

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::{debug, info_span};

use super::{ENGINE_TARGET, EditEngine, EditState, finish, transition};
use crate::error::EditError;
use crate::operation::ReplaceTextRequest;

/// A compiled find pattern with its replacement.
#[derive(Debug, Clone)]
pub(crate) struct Replacer {
    pattern: Regex,
    replacement: String,
    expand: bool,
    limit: Option<usize>,
}

impl Replacer {
    /// Compiles the request's pattern.
    ///
    /// Literal finds are escaped and their replacements inserted verbatim;
    /// regex finds expand `$name` and `$n` group references.
    pub(crate) fn compile(request: &ReplaceTextRequest) -> Result<Self, EditError> {
        if request.find.is_empty() {
            return Err(EditError::EmptyPattern);
        }
        let source = if request.regex {
            request.find.clone()
        } else {
            regex::escape(&request.find)
        };
        let source = if request.whole_word {
            format!(r"\b(?:{source})\b")
        } else {
            source
        };
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(!request.case_sensitive)
            .build()
            .map_err(|err| EditError::InvalidPattern {
                pattern: request.find.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            pattern,
            replacement: request.replace.clone(),
            expand: request.regex,
            limit: request.limit(),
        })
    }

    /// Returns the replaced text and the number of replacements made.
    pub(crate) fn apply(&self, text: &str) -> (String, usize) {
        let found = self.pattern.find_iter(text).count();
        let count = self.limit.map_or(found, |limit| found.min(limit));
        let limit = self.limit.unwrap_or(0);
        let replaced = if self.expand {
            self.pattern
                .replacen(text, limit, self.replacement.as_str())
        } else {
            self.pattern
                .replacen(text, limit, NoExpand(&self.replacement))
        };
        (replaced.into_owned(), count)
    }
}

impl EditEngine<'_> {
    /// Replaces occurrences of a literal or pattern throughout a file.
    ///
    /// The file's text is edited as read, line endings included. When nothing
    /// matches, no backup is taken and the file is not written.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::EmptyPattern`] or [`EditError::InvalidPattern`]
    /// before touching the file, and the usual policy and I/O errors.
    pub fn replace_text(&self, request: &ReplaceTextRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: ENGINE_TARGET,
            "replace_text",
            file = %request.path.display(),
            regex = request.regex,
            case_sensitive = request.case_sensitive,
            whole_word = request.whole_word,
        );
        let _entered = span.enter();
        finish(self.run_replace_text(request))
    }

    fn run_replace_text(&self, request: &ReplaceTextRequest) -> Result<String, EditError> {
        transition(EditState::Validating);
        let replacer = Replacer::compile(request)?;
        let document = self.open(&request.path)?;

        transition(EditState::Applying);
        let (replaced, count) = replacer.apply(&document.original);
        debug!(target: ENGINE_TARGET, replacements = count, "pattern applied");

        if count > 0 {
            if request.create_backup {
                self.backup(&document)?;
            }
            transition(EditState::Writing);
            self.write_text(&document, &replaced)?;
        }
        Ok(format!(
            "Replaced {count} occurrences in {}",
            request.path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn replacer(configure: impl FnOnce(&mut ReplaceTextRequest)) -> Replacer {
        let mut request = ReplaceTextRequest::new("/tmp/unused.txt", "cat", "dog");
        configure(&mut request);
        Replacer::compile(&request).expect("pattern should compile")
    }

    #[test]
    fn literal_find_escapes_metacharacters() {
        let replacer = replacer(|request| {
            request.find = String::from("a.b");
            request.replace = String::from("$1");
        });
        assert_eq!(replacer.apply("a.b axb"), (String::from("$1 axb"), 1));
    }

    #[test]
    fn regex_mode_expands_groups() {
        let replacer = replacer(|request| {
            request.regex = true;
            request.find = String::from(r"(\w+)@(\w+)");
            request.replace = String::from("$2 at $1");
        });
        assert_eq!(replacer.apply("me@home"), (String::from("home at me"), 1));
    }

    #[rstest]
    #[case::sensitive(true, "Cat cat CAT", "Cat dog CAT", 1)]
    #[case::insensitive(false, "Cat cat CAT", "dog dog dog", 3)]
    fn case_sensitivity(
        #[case] case_sensitive: bool,
        #[case] input: &str,
        #[case] expected: &str,
        #[case] count: usize,
    ) {
        let replacer = replacer(|request| request.case_sensitive = case_sensitive);
        assert_eq!(replacer.apply(input), (String::from(expected), count));
    }

    #[test]
    fn whole_word_skips_embedded_matches() {
        let replacer = replacer(|request| request.whole_word = true);
        assert_eq!(
            replacer.apply("cat concat cats cat"),
            (String::from("dog concat cats dog"), 2)
        );
    }

    #[test]
    fn limit_caps_replacements() {
        let replacer = replacer(|request| request.max_replacements = 2);
        assert_eq!(
            replacer.apply("cat cat cat"),
            (String::from("dog dog cat"), 2)
        );
    }

    #[test]
    fn empty_find_is_rejected() {
        let request = ReplaceTextRequest::new("/tmp/unused.txt", "", "x");
        assert!(matches!(
            Replacer::compile(&request),
            Err(EditError::EmptyPattern)
        ));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let mut request = ReplaceTextRequest::new("/tmp/unused.txt", "(unclosed", "x");
        request.regex = true;
        assert!(matches!(
            Replacer::compile(&request),
            Err(EditError::InvalidPattern { .. })
        ));
    }
}
