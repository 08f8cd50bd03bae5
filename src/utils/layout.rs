//! Keyboard-layout normalization for key tokens.
//!
//! Maps characters typed on a Russian or Ukrainian ЙЦУКЕН layout to the
//! US-QWERTY key in the same physical position, so `h/j/k/l` and friends work
//! without switching layouts. Only single-character tokens are translated.

use phf::phf_map;

/// Cyrillic character to the QWERTY key on the same physical position.
/// Russian letters plus the Ukrainian-only ones (ґ, і, є, ї).
static CYRILLIC_TO_QWERTY: phf::Map<char, &'static str> = phf_map! {
    // lower
    'ё' => "`", 'й' => "q", 'ц' => "w", 'у' => "e", 'к' => "r", 'е' => "t",
    'н' => "y", 'г' => "u", 'ш' => "i", 'щ' => "o", 'з' => "p", 'х' => "[",
    'ъ' => "]", 'ф' => "a", 'ы' => "s", 'в' => "d", 'а' => "f", 'п' => "g",
    'р' => "h", 'о' => "j", 'л' => "k", 'д' => "l", 'ж' => ";", 'э' => "'",
    'я' => "z", 'ч' => "x", 'с' => "c", 'м' => "v", 'и' => "b", 'т' => "n",
    'ь' => "m", 'б' => ",", 'ю' => ".",
    'ґ' => "`", 'і' => "s", 'є' => "'", 'ї' => "]",
    // upper
    'Ё' => "~", 'Й' => "Q", 'Ц' => "W", 'У' => "E", 'К' => "R", 'Е' => "T",
    'Н' => "Y", 'Г' => "U", 'Ш' => "I", 'Щ' => "O", 'З' => "P", 'Х' => "{",
    'Ъ' => "}", 'Ф' => "A", 'Ы' => "S", 'В' => "D", 'А' => "F", 'П' => "G",
    'Р' => "H", 'О' => "J", 'Л' => "K", 'Д' => "L", 'Ж' => ":", 'Э' => "\"",
    'Я' => "Z", 'Ч' => "X", 'С' => "C", 'М' => "V", 'И' => "B", 'Т' => "N",
    'Ь' => "M", 'Б' => "<", 'Ю' => ">",
    'Ґ' => "~", 'І' => "S", 'Є' => "\"", 'Ї' => "}",
};

/// Translates a single-character token to its QWERTY equivalent.
///
/// Multi-character tokens such as `ctrl+x` or `enter` pass through unchanged.
pub fn normalize_token(token: &str) -> &str {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => CYRILLIC_TO_QWERTY.get(&c).copied().unwrap_or(token),
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn russian_keys_map_to_qwerty() {
        assert_eq!(normalize_token("р"), "h");
        assert_eq!(normalize_token("о"), "j");
        assert_eq!(normalize_token("л"), "k");
        assert_eq!(normalize_token("д"), "l");
        assert_eq!(normalize_token("П"), "G");
        assert_eq!(normalize_token("Ж"), ":");
    }

    #[test]
    fn ukrainian_specific_keys() {
        assert_eq!(normalize_token("і"), "s");
        assert_eq!(normalize_token("ї"), "]");
        assert_eq!(normalize_token("Є"), "\"");
    }

    #[test]
    fn other_tokens_pass_through() {
        assert_eq!(normalize_token("["), "[");
        assert_eq!(normalize_token("j"), "j");
        assert_eq!(normalize_token("ctrl+x"), "ctrl+x");
        assert_eq!(normalize_token("рр"), "рр");
        assert_eq!(normalize_token(""), "");
    }
}
