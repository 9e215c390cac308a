//! Terminal styling helpers shared by the live view and the plain commands.

use colored::{Color, Colorize};

pub fn checkmark() -> String {
    "✓".green().bold().to_string()
}

pub fn cross() -> String {
    "✗".red().bold().to_string()
}

/// A repository name in its display color.
pub fn repo_name(name: &str, color: Color) -> String {
    name.color(color).bold().to_string()
}

/// A repository's initial in its display color, for compact matrices.
pub fn repo_letter(name: &str, color: Color) -> String {
    match name.chars().next() {
        Some(letter) => letter.to_string().color(color).bold().to_string(),
        None => " ".to_string(),
    }
}

/// Whether a two-symbol porcelain code marks a merge conflict.
pub fn is_conflict_code(code: &str) -> bool {
    matches!(code, "UU" | "AA" | "DD" | "AU" | "UA" | "DU" | "UD")
}

fn colorize_indicator(symbol: char) -> String {
    match symbol {
        'A' | 'R' => symbol.to_string().green().to_string(),
        'M' => symbol.to_string().yellow().to_string(),
        'D' => symbol.to_string().red().to_string(),
        '?' => symbol.to_string().dimmed().to_string(),
        other => other.to_string(),
    }
}

/// Colorize a two-symbol index/worktree status code.
pub fn colorize_status_code(code: &str) -> String {
    let mut symbols = code.chars();
    let (Some(index), Some(worktree), None) = (symbols.next(), symbols.next(), symbols.next())
    else {
        return code.to_string();
    };

    if is_conflict_code(code) {
        return code.red().bold().to_string();
    }
    if code == "!!" {
        return code.dimmed().to_string();
    }
    format!("{}{}", colorize_indicator(index), colorize_indicator(worktree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_conflict_code() {
        for code in ["UU", "AA", "DD", "AU", "UA", "DU", "UD"] {
            assert!(is_conflict_code(code));
        }
        assert!(!is_conflict_code("??"));
        assert!(!is_conflict_code("M "));
    }

    #[test]
    fn test_colorize_status_code_passes_odd_lengths_through() {
        assert_eq!(colorize_status_code("UUU"), "UUU");
        assert_eq!(colorize_status_code("U"), "U");
    }

    #[test]
    fn test_colorize_status_code_keeps_symbols() {
        // Colorized or not, the symbols themselves must survive.
        let rendered = colorize_status_code("M ");
        assert!(rendered.contains('M'));
    }
}
