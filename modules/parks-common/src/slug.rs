/// Turn a display name into the slug form stored on parks, neighborhoods and
/// activities.
///
/// Unicode is folded to ASCII, the result is lowercased, anything that is not
/// a word character, whitespace or hyphen is dropped, and runs of whitespace
/// and hyphens collapse into a single hyphen. Leading and trailing hyphens
/// and underscores are stripped.
pub fn slugify(value: &str) -> String {
    let folded = deunicode::deunicode(value).to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates_words() {
        assert_eq!(slugify("Franklin Park"), "franklin-park");
    }

    #[test]
    fn drops_punctuation_without_splitting_words() {
        assert_eq!(slugify("O'Brien Playground"), "obrien-playground");
        assert_eq!(slugify("St. Mary's Park"), "st-marys-park");
    }

    #[test]
    fn collapses_whitespace_and_hyphen_runs() {
        assert_eq!(slugify("  Back   Bay -- Fens  "), "back-bay-fens");
    }

    #[test]
    fn folds_accents_to_ascii() {
        assert_eq!(slugify("Café Plaza"), "cafe-plaza");
    }

    #[test]
    fn empty_and_symbol_only_input_is_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn keeps_digits_and_underscores_inside() {
        assert_eq!(slugify("Pier 4_North"), "pier-4_north");
    }
}
