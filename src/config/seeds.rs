//! Seed list loading
//!
//! Seeds arrive as plain absolute URLs, one per entry. Files are read line by
//! line; lines are trimmed and blank lines dropped. Lines starting with `#`
//! are treated as comments so `missing_seeds.txt` files can be annotated by
//! hand before re-seeding.

use crate::ConfigResult;
use std::path::Path;

/// Parses seed URLs from newline-separated text
pub fn parse_seed_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Cleans seed values given directly (command line, environment)
///
/// Values are trimmed and empty ones dropped, matching file lines.
pub fn clean_seed_values<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Reads a seeds file containing one URL per line
pub fn load_seeds_file(path: &Path) -> ConfigResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_seed_lines(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_trims_and_skips_blank_lines() {
        let seeds = parse_seed_lines("  http://a/1  \n\n\t\nhttp://a/2\r\n");
        assert_eq!(seeds, vec!["http://a/1", "http://a/2"]);
    }

    #[test]
    fn test_skips_comments() {
        let seeds = parse_seed_lines("# retry these\nhttp://a/1\n  # http://a/2\n");
        assert_eq!(seeds, vec!["http://a/1"]);
    }

    #[test]
    fn test_clean_seed_values() {
        let seeds = clean_seed_values([
            " http://127.0.0.1:8000/a.html",
            "",
            "http://127.0.0.1:8000/b.html\t",
            "   ",
        ]);
        assert_eq!(
            seeds,
            vec!["http://127.0.0.1:8000/a.html", "http://127.0.0.1:8000/b.html"]
        );
    }

    #[test]
    fn test_cleaned_values_pass_validation() {
        let mut config = crate::config::Config::default();
        let from_env = " http://127.0.0.1:8000/, http://127.0.0.1:8000/x";
        config.seeds = clean_seed_values(from_env.split(','));
        assert_eq!(config.seeds.len(), 2);
        assert!(crate::config::validate(&config).is_ok());
    }

    #[test]
    fn test_load_seeds_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "http://127.0.0.1:8000/a.html").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "http://127.0.0.1:8000/b.html").unwrap();
        file.flush().unwrap();

        let seeds = load_seeds_file(file.path()).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1], "http://127.0.0.1:8000/b.html");
    }

    #[test]
    fn test_missing_seeds_file() {
        let result = load_seeds_file(Path::new("/nonexistent/seeds.txt"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
