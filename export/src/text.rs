//! Text encoding and line wrapping for the built-in Helvetica font.
//!
//! The standard 14 fonts only cover WinAnsi (Windows-1252). Cyrillic is
//! transliterated to Latin so Russian reports stay readable; any other
//! character outside the code page becomes `?`.

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.52;

/// Encodes `text` as WinAnsi bytes.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        if let Some(latin) = transliterate(c.to_lowercase().next().unwrap_or(c)) {
            let mut bytes = latin.bytes();
            if let Some(first) = bytes.next() {
                out.push(if c.is_uppercase() { first.to_ascii_uppercase() } else { first });
                out.extend(bytes);
            }
        } else {
            out.push(win_ansi_byte(c).unwrap_or(b'?'));
        }
    }
    out
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '\t' => Some(b' '),
            '€' => Some(0x80),
            '‚' => Some(0x82),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '™' => Some(0x99),
            _ => None,
        },
    }
}

/// Latin spelling of a lowercase Cyrillic letter.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Approximate rendered width of `text` in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    encode_win_ansi(text).len() as f32 * font_size * AVG_GLYPH_WIDTH
}

/// Breaks `text` into lines no wider than `max_width` points.
///
/// Existing line breaks are kept; blank lines survive as empty strings.
/// Words longer than a full line are split by character.
pub fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (font_size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = encode_win_ansi(word).len();
            if current_len > 0 && current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if word_len <= max_chars {
                current.push_str(word);
                current_len = word_len;
            } else {
                for piece in split_long_word(word, max_chars) {
                    lines.push(piece);
                }
                if let Some(last) = lines.pop() {
                    current_len = encode_win_ansi(&last).len();
                    current = last;
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut len = 0usize;
    for c in word.chars() {
        let c_len = encode_win_ansi(c.encode_utf8(&mut [0; 4])).len();
        if len + c_len > max_chars && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            len = 0;
        }
        piece.push(c);
        len += c_len;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
