use super::types::SubItemLabel;

/// Paragraph glyphs `①`..`⑳`; index + 1 is the ordinal. Ordinals outside
/// 1..=20 have no glyph and display as `(n)`.
const CIRCLED_NUMERALS: [char; 20] = [
    '①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩', '⑪', '⑫', '⑬', '⑭', '⑮', '⑯', '⑰',
    '⑱', '⑲', '⑳',
];

/// Sub-item syllables in statute order with their ASCII codes. A syllable
/// not listed here maps to [`SUB_ITEM_FALLBACK_CODE`], which never
/// collides with a listed code.
const SUB_ITEM_CODES: [(char, &str); 14] = [
    ('가', "a"),
    ('나', "b"),
    ('다', "c"),
    ('라', "d"),
    ('마', "e"),
    ('바', "f"),
    ('사', "g"),
    ('아', "h"),
    ('자', "i"),
    ('차', "j"),
    ('카', "k"),
    ('타', "l"),
    ('파', "m"),
    ('하', "n"),
];

pub const SUB_ITEM_FALLBACK_CODE: &str = "zz";

pub fn circled_ordinal(ch: char) -> Option<u32> {
    CIRCLED_NUMERALS
        .iter()
        .position(|glyph| *glyph == ch)
        .map(|index| index as u32 + 1)
}

pub fn display_paragraph(ordinal: u32) -> String {
    ordinal
        .checked_sub(1)
        .and_then(|index| CIRCLED_NUMERALS.get(index as usize))
        .map(|glyph| glyph.to_string())
        .unwrap_or_else(|| format!("({ordinal})"))
}

pub fn sub_item_label(syllable: char) -> SubItemLabel {
    let code = SUB_ITEM_CODES
        .iter()
        .find(|(candidate, _)| *candidate == syllable)
        .map(|(_, code)| *code)
        .unwrap_or(SUB_ITEM_FALLBACK_CODE);

    SubItemLabel { syllable, code }
}

pub fn display_item(ordinal: u32) -> String {
    format!("{ordinal}.")
}

pub fn display_sub_item(label: SubItemLabel) -> String {
    format!("{}.", label.syllable)
}

pub fn display_sub_sub_item(ordinal: u32) -> String {
    format!("{ordinal})")
}

pub fn norm_sub_sub_item(ordinal: u32) -> String {
    format!("{ordinal}p")
}
