use super::*;

fn parser() -> EntryParser {
    EntryParser::new().expect("keyword patterns compile")
}

#[test]
fn parse_entry_reads_extended_format_with_ctr() {
    let record = parser()
        .parse_entry("日本自由行(click: 120, impression: 3000, position: 5.2, ctr: 4.0%)");

    assert_eq!(record.keyword, "日本自由行");
    assert_eq!(record.clicks, Some(120.0));
    assert_eq!(record.impressions, Some(3000.0));
    assert_eq!(record.rank, Some(5.2));
    assert_eq!(record.ctr, Some(4.0));
    assert_eq!(record.search_volume, None);
}

#[test]
fn parse_entry_reads_legacy_clicks_only_format() {
    let record = parser().parse_entry("機票比較(45)");

    assert_eq!(record.keyword, "機票比較");
    assert_eq!(record.clicks, Some(45.0));
    assert_eq!(record.impressions, None);
    assert_eq!(record.rank, None);
    assert_eq!(record.ctr, None);
}

#[test]
fn parse_entry_derives_ctr_when_missing() {
    let record =
        parser().parse_entry("tokyo hotel (clicks: 30, impressions: 1,200, position: 7)");

    assert_eq!(record.keyword, "tokyo hotel");
    assert_eq!(record.impressions, Some(1200.0));
    assert_eq!(record.rank, Some(7.0));
    assert_eq!(record.ctr, Some(2.5));
}

#[test]
fn parse_entry_does_not_derive_ctr_without_impressions() {
    let record = parser().parse_entry("tokyo hotel (click: 30, impression: 0, position: 7)");

    assert_eq!(record.impressions, Some(0.0));
    assert_eq!(record.ctr, None);
}

#[test]
fn parse_entry_turns_unparseable_numbers_into_null() {
    let record = parser().parse_entry("osaka (click: n/a, impression: 10, position: -)");

    assert_eq!(record.keyword, "osaka");
    assert_eq!(record.clicks, None);
    assert_eq!(record.impressions, Some(10.0));
    assert_eq!(record.rank, None);
}

#[test]
fn parse_entry_falls_back_to_text_before_first_paren() {
    let parser = parser();

    let unbalanced = parser.parse_entry("kyoto temple (click: 3, impression");
    assert_eq!(unbalanced.keyword, "kyoto temple");
    assert_eq!(unbalanced.clicks, None);

    let plain = parser.parse_entry("  hokkaido ski  ");
    assert_eq!(plain.keyword, "hokkaido ski");
    assert_eq!(plain.rank, None);
}

#[test]
fn parse_entry_keeps_parentheses_inside_keyword() {
    let record = parser().parse_entry("iphone (2024)(click: 5, impression: 50, position: 2)");

    assert_eq!(record.keyword, "iphone (2024)");
    assert_eq!(record.clicks, Some(5.0));
    assert_eq!(record.rank, Some(2.0));
}

#[test]
fn parse_entry_accepts_empty_fragment() {
    let record = parser().parse_entry("");

    assert_eq!(record.keyword, "");
    assert_eq!(record.clicks, None);
    assert_eq!(record.impressions, None);
    assert_eq!(record.rank, None);
    assert_eq!(record.ctr, None);
}

#[test]
fn split_entries_restores_dropped_closing_paren() {
    let entries = split_entries("a, b(click: 1, impression: 2, position: 3), c(4), plain\nd(5)");

    assert_eq!(
        entries,
        vec![
            "a, b(click: 1, impression: 2, position: 3)",
            "c(4)",
            "plain",
            "d(5)",
        ]
    );
}

#[test]
fn parse_entries_drops_empty_keywords() {
    let records = parser().parse_entries("沖繩住宿(12), (click: 1, impression: 1, position: 1)\n\n");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].keyword, "沖繩住宿");
    assert_eq!(records[0].clicks, Some(12.0));
}

#[test]
fn parse_number_strips_separators_and_rejects_non_finite() {
    assert_eq!(parse_number("1,234.5"), Some(1234.5));
    assert_eq!(parse_number(" 42 "), Some(42.0));
    assert_eq!(parse_number(""), None);
    assert_eq!(parse_number("NaN"), None);
    assert_eq!(parse_number("inf"), None);
}

#[test]
fn normalize_folds_spacing_width_and_trailing_punctuation() {
    let expected = normalize("沖繩住宿");

    assert_eq!(normalize("沖繩 住宿"), expected);
    assert_eq!(normalize("沖繩\u{3000}住宿"), expected);
    assert_eq!(normalize("沖繩住宿。"), expected);
    assert_eq!(normalize("沖繩住宿！"), expected);
    assert_eq!(normalize("\u{FEFF}沖繩\u{200B}住宿"), expected);

    assert_eq!(normalize("ＴＯＫＹＯ　Ｈｏｔｅｌ"), normalize("tokyo hotel"));
    assert_eq!(normalize("Tokyo-Hotel?"), normalize("tokyohotel"));
}

#[test]
fn normalize_keeps_spelling_variants_apart() {
    assert_ne!(normalize("tokyo hotel"), normalize("tokio hotel"));
    assert_ne!(normalize("c++"), normalize("c"));
    assert_ne!(normalize("c#"), normalize("c"));
}

#[test]
fn normalize_is_idempotent() {
    let samples = [
        "沖繩 住宿",
        "ＴＯＫＹＯ　Ｈｏｔｅｌ",
        "e \u{301}clair",
        "Straße",
        "!!!",
        "  ",
        "ｶﾞｲﾄﾞ",
        "「日本」自由行…",
        "\u{FEFF}",
    ];

    for sample in samples {
        let once = normalize(sample);
        let twice = normalize(once.as_str());
        assert_eq!(once, twice, "normalize not idempotent for {sample:?}");
    }
}

#[test]
fn normalize_falls_back_when_everything_is_stripped() {
    assert_eq!(normalize(" !!! ").as_str(), "!!!");
    assert_eq!(normalize("").as_str(), "");
    assert!(normalize("   ").is_empty());
    assert!(normalize("\u{FEFF}").is_empty());
}

#[test]
fn punctuation_only_keys_still_fold_width_and_spacing() {
    let expected = normalize("!!!");

    assert_eq!(normalize("！！！"), expected);
    assert_eq!(normalize(" ! ! !"), expected);
    assert_eq!(normalize("!\u{200B}!\u{3000}!"), expected);
    assert_ne!(normalize("???"), expected);
}
