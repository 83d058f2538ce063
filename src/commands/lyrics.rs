use crate::sources::ManualLyrics;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Lyrics read from a file given on the command line.
pub struct FileLyrics {
    path: PathBuf,
}

impl FileLyrics {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ManualLyrics for FileLyrics {
    fn prompt(&self, performer: &str, title: &str) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if !text.trim().is_empty() => {
                log::info!(
                    "Using lyrics from {} for '{performer} - {title}'",
                    self.path.display()
                );
                Some(text)
            }
            Ok(_) => None,
            Err(e) => {
                log::warn!("Cannot read lyrics file {}: {e}", self.path.display());
                None
            }
        }
    }
}

/// Lyrics pasted on stdin, terminated by an empty line or end of input.
pub struct StdinLyrics;

impl ManualLyrics for StdinLyrics {
    fn prompt(&self, performer: &str, title: &str) -> Option<String> {
        println!("\n📝 No lyrics found for '{performer} - {title}'.");
        println!("   Paste them below and finish with an empty line (or just press Enter to skip):");
        let _ = io::stdout().flush();

        let mut lines = Vec::new();
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => break,
                Ok(line) => lines.push(line),
                Err(e) => {
                    log::warn!("Failed to read lyrics from stdin: {e}");
                    break;
                }
            }
        }

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// The manual source chosen on the command line.
pub enum ManualSource {
    File(FileLyrics),
    Stdin(StdinLyrics),
}

impl ManualLyrics for ManualSource {
    fn prompt(&self, performer: &str, title: &str) -> Option<String> {
        match self {
            ManualSource::File(source) => source.prompt(performer, title),
            ManualSource::Stdin(source) => source.prompt(performer, title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_lyrics() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Refrain]\nJ'ai la tête qui tourne").unwrap();

        let source = FileLyrics::new(file.path().to_path_buf());
        let text = source.prompt("Angèle", "Tout oublier").unwrap();
        assert!(text.contains("la tête qui tourne"));
    }

    #[test]
    fn test_missing_or_blank_file_gives_none() {
        let missing = FileLyrics::new(PathBuf::from("/nonexistent/atelier/lyrics.txt"));
        assert_eq!(missing.prompt("a", "b"), None);

        let blank = tempfile::NamedTempFile::new().unwrap();
        let source = ManualSource::File(FileLyrics::new(blank.path().to_path_buf()));
        assert_eq!(source.prompt("a", "b"), None);
    }
}
