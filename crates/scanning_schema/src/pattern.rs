//! XSD `pattern` facets in `regex` syntax.
//!
//! XML Schema regular expressions are implicitly anchored and have no
//! anchors of their own, so `^` and `$` are literals. They add the name
//! escapes `\i` and `\c`, Unicode block properties (`\p{IsBasicLatin}`) and
//! character class subtraction (`[a-z-[aeiou]]`). Everything here rewrites
//! those into what the `regex` crate understands.

use regex::Regex;

/// Compile an XSD pattern, anchored at both ends.
pub fn compile(pattern: &str) -> Result<Regex, String> {
    let translated = translate(pattern)?;
    Regex::new(&format!("^(?:{})$", translated)).map_err(|e| e.to_string())
}

/// Rewrite an XSD pattern into `regex` syntax. The result is not anchored.
pub fn translate(pattern: &str) -> Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => out.push_str(&escape(&chars, &mut i)?),
            '[' => out.push_str(&class(&chars, &mut i)?),
            '.' => {
                out.push_str(r"[^\n\r]");
                i += 1;
            }
            c @ ('^' | '$') => {
                out.push('\\');
                out.push(c);
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Single or multi-character escape starting at `chars[*i] == '\\'`.
fn escape(chars: &[char], i: &mut usize) -> Result<String, String> {
    let c = *chars
        .get(*i + 1)
        .ok_or_else(|| "pattern ends with a backslash".to_string())?;
    *i += 2;
    let rewritten = match c {
        'i' => r"[\p{L}_:]".to_string(),
        'I' => r"[^\p{L}_:]".to_string(),
        'c' => r"[\p{L}\p{N}\p{M}._:\-]".to_string(),
        'C' => r"[^\p{L}\p{N}\p{M}._:\-]".to_string(),
        's' => r"[ \t\n\r]".to_string(),
        'S' => r"[^ \t\n\r]".to_string(),
        'w' => r"[^\p{P}\p{Z}\p{C}]".to_string(),
        'W' => r"[\p{P}\p{Z}\p{C}]".to_string(),
        'p' | 'P' => property(chars, i, c == 'P')?,
        other => format!("\\{}", other),
    };
    Ok(rewritten)
}

/// `\p{..}` / `\P{..}` with `*i` just past the letter.
fn property(chars: &[char], i: &mut usize, negated: bool) -> Result<String, String> {
    if chars.get(*i) != Some(&'{') {
        return Err("expected '{' after \\p".to_string());
    }
    let close = chars[*i..]
        .iter()
        .position(|&c| c == '}')
        .ok_or_else(|| "unterminated \\p{...}".to_string())?;
    let name: String = chars[*i + 1..*i + close].iter().collect();
    *i += close + 1;

    match name.strip_prefix("Is") {
        Some(block) => {
            let range = block_range(block)
                .ok_or_else(|| format!("unsupported Unicode block '{}'", block))?;
            Ok(format!("[{}{}]", if negated { "^" } else { "" }, range))
        }
        None => Ok(format!("\\{}{{{}}}", if negated { 'P' } else { 'p' }, name)),
    }
}

/// Character class starting at `chars[*i] == '['`, subtraction included.
fn class(chars: &[char], i: &mut usize) -> Result<String, String> {
    let mut out = String::from("[");
    *i += 1;
    if chars.get(*i) == Some(&'^') {
        out.push('^');
        *i += 1;
    }
    loop {
        let c = *chars
            .get(*i)
            .ok_or_else(|| "unterminated character class".to_string())?;
        match c {
            ']' => {
                out.push(']');
                *i += 1;
                return Ok(out);
            }
            '\\' => out.push_str(&escape(chars, i)?),
            '-' if chars.get(*i + 1) == Some(&'[') => {
                *i += 1;
                out.push_str("--");
                out.push_str(&class(chars, i)?);
            }
            '[' | '&' | '~' => {
                out.push('\\');
                out.push(c);
                *i += 1;
            }
            c => {
                out.push(c);
                *i += 1;
            }
        }
    }
}

fn block_range(block: &str) -> Option<&'static str> {
    let range = match block {
        "BasicLatin" => r"\x{0}-\x{7F}",
        "Latin-1Supplement" => r"\x{80}-\x{FF}",
        "LatinExtended-A" => r"\x{100}-\x{17F}",
        "LatinExtended-B" => r"\x{180}-\x{24F}",
        "IPAExtensions" => r"\x{250}-\x{2AF}",
        "SpacingModifierLetters" => r"\x{2B0}-\x{2FF}",
        "CombiningDiacriticalMarks" => r"\x{300}-\x{36F}",
        "Greek" | "GreekandCoptic" => r"\x{370}-\x{3FF}",
        "Cyrillic" => r"\x{400}-\x{4FF}",
        "LatinExtendedAdditional" => r"\x{1E00}-\x{1EFF}",
        "GeneralPunctuation" => r"\x{2000}-\x{206F}",
        "CurrencySymbols" => r"\x{20A0}-\x{20CF}",
        "LetterlikeSymbols" => r"\x{2100}-\x{214F}",
        "NumberForms" => r"\x{2150}-\x{218F}",
        "Arrows" => r"\x{2190}-\x{21FF}",
        _ => return None,
    };
    Some(range)
}
