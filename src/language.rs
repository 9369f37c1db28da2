// src/language.rs - Language catalog and filename-based selection

use std::path::Path;

use log::debug;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not read language catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid language catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One entry of the language catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageDescriptor {
    pub name: String,
    /// Whitespace-separated filename globs (`*` any run, `?` one character),
    /// matched case-sensitively against the whole file name.
    pub patterns: String,
    /// Flat token list handed to the lexer as-is.
    #[serde(default)]
    pub keywords: String,
    /// Identifier of the highlighting engine; `None` renders as plain text.
    #[serde(default)]
    pub lexer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    language: Vec<LanguageDescriptor>,
}

/// Ordered catalog of languages. Declaration order is significant: when
/// several descriptors match a filename, the earliest one wins, silently.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDescriptor>,
}

impl LanguageRegistry {
    pub fn new(languages: Vec<LanguageDescriptor>) -> Self {
        Self { languages }
    }

    /// Parses a catalog from TOML text with `[[language]]` entries.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self::new(file.language))
    }

    /// Reads a catalog file, e.g. a `languages.toml` shipped with the editor.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Picks the language for a filename, or `None` for plain-text mode.
    pub fn select_language(&self, file_name: &str) -> Option<&LanguageDescriptor> {
        if file_name.is_empty() {
            return None;
        }
        let selected = self.languages.iter().find(|lang| {
            lang.patterns
                .split_whitespace()
                .any(|pattern| wildcard_match(pattern, file_name))
        });
        if let Some(lang) = selected {
            debug!("selected language {} for {}", lang.name, file_name);
        }
        selected
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageDescriptor> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            descriptor(
                "C++",
                "*.cpp *.cxx *.cc *.hpp *.hxx *.h",
                "alignas alignof asm auto bool break case catch char class const \
                 constexpr const_cast continue decltype default delete do double \
                 dynamic_cast else enum explicit export extern false float for friend \
                 goto if inline int long mutable namespace new noexcept nullptr \
                 operator private protected public reinterpret_cast return short \
                 signed sizeof static static_assert static_cast struct switch \
                 template this throw true try typedef typeid typename union unsigned \
                 using virtual void volatile wchar_t while",
                Some("cpp"),
            ),
            descriptor(
                "C",
                "*.c",
                "auto break case char const continue default do double else enum \
                 extern float for goto if inline int long register restrict return \
                 short signed sizeof static struct switch typedef union unsigned \
                 void volatile while",
                Some("cpp"),
            ),
            descriptor(
                "Java",
                "*.java",
                "abstract assert boolean break byte case catch char class const \
                 continue default do double else enum extends final finally float \
                 for goto if implements import instanceof int interface long native \
                 new package private protected public return short static strictfp \
                 super switch synchronized this throw throws transient try void \
                 volatile while",
                Some("cpp"),
            ),
            descriptor(
                "JavaScript",
                "*.js *.mjs",
                "break case catch class const continue debugger default delete do \
                 else export extends finally for function if import in instanceof \
                 let new return super switch this throw try typeof var void while \
                 with yield",
                Some("cpp"),
            ),
            descriptor(
                "Rust",
                "*.rs",
                "as async await break const continue crate dyn else enum extern \
                 false fn for if impl in let loop match mod move mut pub ref return \
                 self static struct super trait true type unsafe use where while",
                Some("rust"),
            ),
            descriptor(
                "Python",
                "*.py *.pyw",
                "False None True and as assert async await break class continue def \
                 del elif else except finally for from global if import in is lambda \
                 nonlocal not or pass raise return try while with yield",
                Some("python"),
            ),
            descriptor("HTML", "*.html *.htm", "", Some("hypertext")),
            descriptor("XML", "*.xml *.xsl *.svg", "", Some("xml")),
            descriptor("CSS", "*.css", "", Some("css")),
            descriptor(
                "Makefile",
                "Makefile makefile GNUmakefile *.mak",
                "",
                Some("makefile"),
            ),
            descriptor(
                "Bash",
                "*.sh *.bash",
                "case do done elif else esac fi for function if in select then time \
                 until while",
                Some("bash"),
            ),
            descriptor(
                "SQL",
                "*.sql",
                "alter and as asc begin by commit create delete desc distinct drop \
                 from group having in index insert into join like not null on or \
                 order primary rollback select set table union update values where",
                Some("sql"),
            ),
        ])
    }
}

fn descriptor(
    name: &str,
    patterns: &str,
    keywords: &str,
    lexer: Option<&str>,
) -> LanguageDescriptor {
    LanguageDescriptor {
        name: name.to_string(),
        patterns: patterns.to_string(),
        keywords: keywords.to_string(),
        lexer: lexer.map(str::to_string),
    }
}

/// Whole-string wildcard match: `*` is any run of characters, `?` exactly
/// one. Never a substring search.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let mut source = String::with_capacity(pattern.len() + 2);
    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            _ => source.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    Regex::new(&source).map(|re| re.is_match(name)).unwrap_or(false)
}
